#![deny(missing_docs)]

//! # Validation
//!
//! Synchronous checks raised at the call site, plus a structural conformance
//! check of a projected document.
//!
//! The conformance check normalizes the OpenAPI 3.0 dialect produced by this crate
//! into the 3.1 shape `utoipa` deserializes, then parses it into
//! `utoipa::openapi::OpenApi`. Only fields that are known compatibility gaps are
//! rewritten.

use crate::error::{AppError, AppResult};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use url::Url;

const EXTENSION_PATTERN: &str = r"^x-";

fn extension_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EXTENSION_PATTERN).expect("Invalid regex constant"))
}

/// Ensures a specification extension name starts with `x-`.
pub fn validate_extension_name(name: &str) -> AppResult<()> {
    if extension_regex().is_match(name) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Extension name '{}' must start with 'x-'",
            name
        )))
    }
}

/// Ensures `value` is an absolute URL carrying both a scheme and a host.
///
/// `field` names the offending attribute in the error message.
pub fn validate_url(value: &str, field: &str) -> AppResult<()> {
    let parsed = Url::parse(value).map_err(|e| {
        AppError::Validation(format!("Invalid URL for {}: '{}' ({})", field, value, e))
    })?;
    if !parsed.has_host() {
        return Err(AppError::Validation(format!(
            "URL for {} must include a host: '{}'",
            field, value
        )));
    }
    Ok(())
}

/// Parses a projected document into `utoipa`'s OpenAPI model.
///
/// Fails with a validation error when the document does not have the shape of an
/// OpenAPI Object (missing `info`, malformed paths, unknown schema types and so on).
pub fn check_document(document: &Value) -> AppResult<utoipa::openapi::OpenApi> {
    let mut json_val = document.clone();

    // utoipa 5.x only accepts 3.1 version strings.
    match json_val.get_mut("openapi") {
        Some(ver) if ver.as_str().is_some_and(|v| v.starts_with("3.")) => {
            *ver = Value::String("3.1.0".to_string());
        }
        Some(ver) => {
            return Err(AppError::Validation(format!(
                "Unsupported OpenAPI version: {}",
                ver
            )))
        }
        None => {
            return Err(AppError::Validation(
                "OpenAPI document missing required 'openapi' field".into(),
            ))
        }
    }

    normalize_schema_fields(&mut json_val);

    serde_json::from_value::<utoipa::openapi::OpenApi>(json_val)
        .map_err(|e| AppError::Validation(format!("Document does not conform to OpenAPI: {}", e)))
}

/// Rewrites 3.0 schema keywords into their 3.1 forms, recursively.
///
/// - `nullable: true` becomes a `type` union with `"null"`,
/// - boolean `exclusiveMinimum` / `exclusiveMaximum` fold the bound they qualify.
pub(crate) fn normalize_schema_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            apply_nullable_flag(map);
            fold_exclusive_bound(map, "exclusiveMinimum", "minimum");
            fold_exclusive_bound(map, "exclusiveMaximum", "maximum");
            for v in map.values_mut() {
                normalize_schema_fields(v);
            }
        }
        Value::Array(items) => {
            for v in items.iter_mut() {
                normalize_schema_fields(v);
            }
        }
        _ => {}
    }
}

fn apply_nullable_flag(map: &mut Map<String, Value>) {
    let Some(Value::Bool(nullable)) = map.get("nullable").cloned() else {
        return;
    };
    map.remove("nullable");
    if !nullable {
        return;
    }
    if let Some(Value::String(s)) = map.get("type").cloned() {
        if s != "null" {
            map.insert(
                "type".to_string(),
                Value::Array(vec![Value::String(s), Value::String("null".to_string())]),
            );
        }
    }
}

fn fold_exclusive_bound(map: &mut Map<String, Value>, flag: &str, bound: &str) {
    let Some(Value::Bool(exclusive)) = map.get(flag).cloned() else {
        return;
    };
    map.remove(flag);
    if exclusive {
        if let Some(limit) = map.remove(bound) {
            map.insert(flag.to_string(), limit);
        }
    }
}
