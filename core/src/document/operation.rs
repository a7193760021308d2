#![deny(missing_docs)]

//! # Operations
//!
//! One `Operation` per HTTP method on a path. The method is fixed when the
//! operation is built and decides which `PathItem` slot it lands in.

use crate::document::content::{RefOr, RequestBody, ResponsesObject};
use crate::document::parameter::{reconcile, Parameter};
use crate::document::paths::PathItem;
use crate::document::server::{push_unique, Server};
use crate::document::tag::ExternalDocumentation;
use crate::error::{AppError, AppResult};
use crate::model::{impl_extensible, Extensions, Projection, ToDict};
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// HTTP methods an operation can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
    /// `TRACE`
    Trace,
}

impl HttpMethod {
    /// Every method, in path item slot order.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// Upper-case method name, as the host framework expects it.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lower-case key of the method's slot in a path item.
    pub fn slot(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::Validation(format!("Unknown HTTP method: '{}'", s)))
    }
}

/// Out-of-band requests the API may send, keyed by runtime expression.
///
/// Only holds path items; expressions are not evaluated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Callback {
    /// Path items keyed by callback URL expression.
    pub expressions: IndexMap<String, PathItem>,
}

impl Callback {
    /// Creates an empty callback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the path item for an expression.
    pub fn with_expression(mut self, expression: impl Into<String>, item: PathItem) -> Self {
        self.expressions.insert(expression.into(), item);
        self
    }
}

impl ToDict for Callback {
    fn project(&self, out: &mut Projection) {
        for (expression, item) in &self.expressions {
            out.raw(expression.clone(), item.to_value());
        }
    }
}

/// Names of security schemes mapped to the scopes an operation needs.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// A single API operation on a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    method: HttpMethod,
    /// Tag names for grouping.
    pub tags: Vec<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// External documentation.
    pub external_docs: Option<ExternalDocumentation>,
    /// Unique operation identifier.
    pub operation_id: Option<String>,
    /// Parameters, unique by name and location.
    pub parameters: Vec<Parameter>,
    /// Request body.
    pub request_body: Option<RefOr<RequestBody>>,
    /// Expected responses.
    pub responses: ResponsesObject,
    /// Callbacks keyed by name.
    pub callbacks: IndexMap<String, Callback>,
    /// Marks the operation as deprecated.
    pub deprecated: Option<bool>,
    /// Alternative security requirements.
    pub security: Vec<SecurityRequirement>,
    /// Servers overriding the document's.
    pub servers: Vec<Server>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Operation {
    /// Creates an operation bound to `method`.
    pub fn new(method: HttpMethod, responses: ResponsesObject) -> Self {
        Self {
            method,
            tags: Vec::new(),
            summary: None,
            description: None,
            external_docs: None,
            operation_id: None,
            parameters: Vec::new(),
            request_body: None,
            responses,
            callbacks: IndexMap::new(),
            deprecated: None,
            security: Vec::new(),
            servers: Vec::new(),
            extensions: Extensions::new(),
        }
    }

    /// Creates an operation from a method name such as `"get"` or `"POST"`.
    pub fn from_method(method: &str, responses: ResponsesObject) -> AppResult<Self> {
        Ok(Self::new(method.parse()?, responses))
    }

    /// A `GET` operation.
    pub fn get(responses: ResponsesObject) -> Self {
        Self::new(HttpMethod::Get, responses)
    }

    /// A `PUT` operation.
    pub fn put(responses: ResponsesObject) -> Self {
        Self::new(HttpMethod::Put, responses)
    }

    /// A `POST` operation.
    pub fn post(responses: ResponsesObject) -> Self {
        Self::new(HttpMethod::Post, responses)
    }

    /// A `DELETE` operation.
    pub fn delete(responses: ResponsesObject) -> Self {
        Self::new(HttpMethod::Delete, responses)
    }

    /// An `OPTIONS` operation.
    pub fn options(responses: ResponsesObject) -> Self {
        Self::new(HttpMethod::Options, responses)
    }

    /// A `HEAD` operation.
    pub fn head(responses: ResponsesObject) -> Self {
        Self::new(HttpMethod::Head, responses)
    }

    /// A `PATCH` operation.
    pub fn patch(responses: ResponsesObject) -> Self {
        Self::new(HttpMethod::Patch, responses)
    }

    /// A `TRACE` operation.
    pub fn trace(responses: ResponsesObject) -> Self {
        Self::new(HttpMethod::Trace, responses)
    }

    /// The method this operation is bound to.
    pub fn http_method(&self) -> HttpMethod {
        self.method
    }

    /// Adds a tag name.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Sets the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the operation id.
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Sets external documentation.
    pub fn with_external_docs(mut self, docs: ExternalDocumentation) -> Self {
        self.external_docs = Some(docs);
        self
    }

    /// Adds a parameter, merging it into an existing one with the same name and location.
    pub fn add_parameter(&mut self, parameter: Parameter) -> &mut Self {
        reconcile(&mut self.parameters, &parameter);
        self
    }

    /// Builder form of [`Operation::add_parameter`].
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.add_parameter(parameter);
        self
    }

    /// Sets the request body.
    pub fn with_request_body(mut self, body: impl Into<RefOr<RequestBody>>) -> Self {
        self.request_body = Some(body.into());
        self
    }

    /// Sets `deprecated`.
    pub fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    /// Adds an alternative security requirement.
    pub fn with_security<I, S>(mut self, scheme: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut requirement = SecurityRequirement::new();
        requirement.insert(scheme.into(), scopes.into_iter().map(Into::into).collect());
        self.security.push(requirement);
        self
    }

    /// Adds a server override; equal servers are listed once.
    pub fn with_server(mut self, server: Server) -> Self {
        push_unique(&mut self.servers, server);
        self
    }

    /// Adds a named callback.
    pub fn add_callback(&mut self, name: impl Into<String>, callback: Callback) -> &mut Self {
        self.callbacks.insert(name.into(), callback);
        self
    }
}

impl ToDict for Operation {
    fn project(&self, out: &mut Projection) {
        out.field("tags", &self.tags)
            .field("summary", &self.summary)
            .field("description", &self.description)
            .model("external_docs", self.external_docs.as_ref())
            .field("operation_id", &self.operation_id)
            .models("parameters", &self.parameters)
            .model("request_body", self.request_body.as_ref());
        // `responses` is required, even when nothing has been declared yet.
        out.raw("responses", self.responses.to_value())
            .model_map("callbacks", &self.callbacks)
            .field("deprecated", &self.deprecated)
            .field("security", &self.security)
            .models("servers", &self.servers)
            .extensions(&self.extensions);
    }
}

impl_extensible!(Operation);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::content::ResponseObject;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ok() -> ResponsesObject {
        ResponsesObject::new().with_response("200", ResponseObject::new("OK"))
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("PATCH".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!(matches!(
            "FETCH".parse::<HttpMethod>(),
            Err(AppError::Validation(_))
        ));
        assert_eq!(HttpMethod::Options.slot(), "options");
    }

    #[test]
    fn test_from_method_fixes_slot() {
        let op = Operation::from_method("delete", ok()).unwrap();
        assert_eq!(op.http_method(), HttpMethod::Delete);
        assert!(Operation::from_method("nope", ok()).is_err());
    }

    #[test]
    fn test_operation_projection() {
        let op = Operation::get(ok())
            .with_tag("pets")
            .with_tag("pets")
            .with_summary("List pets")
            .with_operation_id("list_pets")
            .with_parameter(Parameter::query("limit").with_required(false))
            .with_security("api_key", Vec::<String>::new())
            .with_deprecated(false);
        assert_eq!(
            op.to_value(),
            json!({
                "tags": ["pets"],
                "summary": "List pets",
                "operationId": "list_pets",
                "parameters": [
                    {"name": "limit", "in": "query", "required": false, "style": "form"}
                ],
                "responses": {"200": {"description": "OK"}},
                "deprecated": false,
                "security": [{"api_key": []}]
            })
        );
    }

    #[test]
    fn test_duplicate_parameters_are_reconciled() {
        let mut op = Operation::post(ok());
        op.add_parameter(Parameter::header("X-Trace"));
        op.add_parameter(Parameter::header("X-Trace").with_description("Trace id"));
        assert_eq!(op.parameters.len(), 1);
        assert_eq!(op.parameters[0].description.as_deref(), Some("Trace id"));
    }

    #[test]
    fn test_callback_projection() {
        let mut op = Operation::post(ok());
        let item = PathItem::new().with_operation(Operation::post(ok()));
        op.add_callback(
            "onEvent",
            Callback::new().with_expression("{$request.body#/callbackUrl}", item),
        );
        assert_eq!(
            op.to_dict()["callbacks"],
            json!({
                "onEvent": {
                    "{$request.body#/callbackUrl}": {
                        "post": {"responses": {"200": {"description": "OK"}}}
                    }
                }
            })
        );
    }
}
