#![deny(missing_docs)]

//! # Route Registration
//!
//! Helpers for the glue between a web framework and the document: translating
//! framework route templates into OpenAPI path templates, and turning a route
//! declaration into a merged [`PathItem`].
//!
//! Supported template segments:
//!
//! - `<name>`, `<converter:name>` and `<converter(args):name>` (Werkzeug style),
//! - `:name` (Express / Axum 0.7 style),
//! - `{name}` (already OpenAPI style).

use crate::document::{
    HttpMethod, OpenApi, Operation, Parameter, PathItem, Paths, ResponsesObject, Server, Tag,
};
use crate::error::AppResult;
use crate::schema::Schema;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

const ANGLE_PARAM_PATTERN: &str =
    r"<(?:(?P<conv>[A-Za-z_][A-Za-z0-9_]*)(?:\([^)>]*\))?:)?(?P<name>[A-Za-z_][A-Za-z0-9_]*)>";
const COLON_PARAM_PATTERN: &str = r"(?P<lead>^|/):(?P<name>[A-Za-z_][A-Za-z0-9_]*)";
const BRACE_PARAM_PATTERN: &str = r"\{(?P<name>[A-Za-z_][A-Za-z0-9_]*)\}";

fn angle_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ANGLE_PARAM_PATTERN).expect("Invalid regex constant"))
}

fn colon_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(COLON_PARAM_PATTERN).expect("Invalid regex constant"))
}

fn brace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BRACE_PARAM_PATTERN).expect("Invalid regex constant"))
}

/// Converts a framework route template into an OpenAPI path template.
///
/// `/pets/<int:pet_id>` and `/pets/:pet_id` both become `/pets/{pet_id}`.
pub fn openapi_path(template: &str) -> String {
    let path = angle_regex().replace_all(template, "{$name}");
    colon_regex()
        .replace_all(&path, "${lead}{$name}")
        .into_owned()
}

/// A path parameter found in a route template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    /// Parameter name.
    pub name: String,
    /// Framework converter (`int`, `float`, `uuid`, `path`, ...), when given.
    pub converter: Option<String>,
}

impl PathParam {
    /// Schema implied by the converter.
    pub fn schema(&self) -> Schema {
        match self.converter.as_deref() {
            Some("int") => Schema::integer(),
            Some("float") => Schema::number(),
            Some("uuid") => Schema::string().with_format("uuid"),
            _ => Schema::string(),
        }
    }
}

/// Path parameters of a route template, in order of appearance.
pub fn path_params(template: &str) -> Vec<PathParam> {
    let mut params: Vec<PathParam> = Vec::new();
    for caps in angle_regex().captures_iter(template) {
        params.push(PathParam {
            name: caps["name"].to_string(),
            converter: caps.name("conv").map(|m| m.as_str().to_string()),
        });
    }
    let rest = angle_regex().replace_all(template, "");
    for caps in colon_regex()
        .captures_iter(&rest)
        .chain(brace_regex().captures_iter(&rest))
    {
        let name = caps["name"].to_string();
        if !params.iter().any(|p| p.name == name) {
            params.push(PathParam {
                name,
                converter: None,
            });
        }
    }
    params
}

/// What the framework needs to bind a route, without the documentation-only data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOptions {
    /// The route template as given to the framework.
    pub rule: String,
    /// Upper-case HTTP method names.
    pub methods: Vec<String>,
}

/// A documented route declaration.
///
/// Methods default to `GET`. Every method named shares the route's responses and
/// tags; fully built operations can be supplied instead.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    rule: String,
    methods: Vec<String>,
    operations: Vec<Operation>,
    ref_path: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    servers: Vec<Server>,
    parameters: Vec<Parameter>,
    responses: ResponsesObject,
    tags: Vec<Tag>,
}

impl RouteSpec {
    /// A route for the framework template `rule`.
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            methods: Vec::new(),
            operations: Vec::new(),
            ref_path: None,
            summary: None,
            description: None,
            servers: Vec::new(),
            parameters: Vec::new(),
            responses: ResponsesObject::new(),
            tags: Vec::new(),
        }
    }

    /// Adds methods by name.
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods.extend(methods.into_iter().map(Into::into));
        self
    }

    /// Adds a fully built operation.
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Points the path item at an external definition.
    pub fn with_ref(mut self, ref_path: impl Into<String>) -> Self {
        self.ref_path = Some(ref_path.into());
        self
    }

    /// Sets the path item summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the path item description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a server for the path.
    pub fn with_server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    /// Adds a parameter shared by every method of the path.
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Sets the responses of the operations created from method names.
    pub fn with_responses(mut self, responses: ResponsesObject) -> Self {
        self.responses = responses;
        self
    }

    /// Tags the operations created from method names.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Tags the operations by name.
    pub fn with_tag_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(names.into_iter().map(Tag::new));
        self
    }

    /// The OpenAPI path template of the route.
    pub fn path(&self) -> String {
        openapi_path(&self.rule)
    }

    /// Builds the path item described by the route.
    ///
    /// Fails when a method name is not an HTTP method.
    pub fn path_item(&self) -> AppResult<PathItem> {
        let mut item = PathItem::new();
        item.ref_path.clone_from(&self.ref_path);
        item.summary.clone_from(&self.summary);
        item.description.clone_from(&self.description);
        for server in &self.servers {
            item.add_server(server.clone());
        }
        for parameter in &self.parameters {
            item.add_parameter(parameter.clone());
        }
        for param in path_params(&self.rule) {
            let schema = param.schema();
            item.add_parameter(Parameter::path(param.name).with_resolved_schema(schema));
        }
        for operation in self.operations()? {
            item.add_operation(operation);
        }
        Ok(item)
    }

    fn operations(&self) -> AppResult<Vec<Operation>> {
        let mut operations = self.operations.clone();
        let named = if self.methods.is_empty() && operations.is_empty() {
            vec![HttpMethod::Get.as_str().to_string()]
        } else {
            self.methods.clone()
        };
        for method in &named {
            let mut operation = Operation::from_method(method, self.responses.clone())?;
            for tag in &self.tags {
                operation = operation.with_tag(tag.name.clone());
            }
            operations.push(operation);
        }
        Ok(operations)
    }

    /// Adds the route's path item to `paths`, merging with what is already there.
    pub fn register(&self, paths: &mut Paths) -> AppResult<RouteOptions> {
        let item = self.path_item()?;
        let methods = item
            .methods()
            .into_iter()
            .map(|m| m.as_str().to_string())
            .collect();
        let path = self.path();
        debug!(rule = %self.rule, path = %path, "Registering route");
        paths.add(path, item);
        Ok(RouteOptions {
            rule: self.rule.clone(),
            methods,
        })
    }

    /// Registers the route on a document and declares its tags there.
    pub fn register_on(&self, api: &mut OpenApi) -> AppResult<RouteOptions> {
        let options = self.register(&mut api.paths)?;
        for tag in &self.tags {
            api.add_tag(tag.clone());
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Info, ResponseObject};
    use crate::error::AppError;
    use crate::model::ToDict;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_openapi_path_translation() {
        assert_eq!(openapi_path("/pets/<pet_id>"), "/pets/{pet_id}");
        assert_eq!(openapi_path("/pets/<int:pet_id>/toys"), "/pets/{pet_id}/toys");
        assert_eq!(
            openapi_path("/files/<any(a, b):kind>/<path:rest>"),
            "/files/{kind}/{rest}"
        );
        assert_eq!(openapi_path("/users/:user_id/posts"), "/users/{user_id}/posts");
        assert_eq!(openapi_path("/health"), "/health");
        assert_eq!(openapi_path("/already/{id}"), "/already/{id}");
    }

    #[test]
    fn test_path_params_carry_converters() {
        let params = path_params("/a/<int:id>/<uuid:ref>/<name>/:extra/{tail}");
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "ref", "name", "extra", "tail"]);
        assert_eq!(params[0].schema().to_value(), json!({"type": "integer", "format": "int32"}));
        assert_eq!(params[1].schema().to_value(), json!({"type": "string", "format": "uuid"}));
        assert_eq!(params[2].schema().to_value(), json!({"type": "string"}));
    }

    #[test]
    fn test_register_defaults_to_get() {
        let mut paths = Paths::new();
        let options = RouteSpec::new("/pets/<int:pet_id>")
            .with_responses(
                ResponsesObject::new().with_response("200", ResponseObject::new("A pet")),
            )
            .register(&mut paths)
            .unwrap();
        assert_eq!(
            options,
            RouteOptions {
                rule: "/pets/<int:pet_id>".to_string(),
                methods: vec!["GET".to_string()],
            }
        );
        assert_eq!(
            paths.to_value(),
            json!({
                "/pets/{pet_id}": {
                    "get": {"responses": {"200": {"description": "A pet"}}},
                    "parameters": [{
                        "name": "pet_id",
                        "in": "path",
                        "required": true,
                        "style": "simple",
                        "schema": {"type": "integer", "format": "int32"}
                    }]
                }
            })
        );
    }

    #[test]
    fn test_routes_on_same_path_merge() {
        let mut paths = Paths::new();
        RouteSpec::new("/pets/<pet_id>")
            .with_methods(["get"])
            .with_parameter(Parameter::path("pet_id").with_description("Pet id"))
            .register(&mut paths)
            .unwrap();
        let options = RouteSpec::new("/pets/:pet_id")
            .with_methods(["DELETE", "PUT"])
            .with_summary("One pet")
            .register(&mut paths)
            .unwrap();
        assert_eq!(options.methods, vec!["PUT", "DELETE"]);

        let item = paths.get("/pets/{pet_id}").unwrap();
        assert_eq!(
            item.methods(),
            vec![HttpMethod::Get, HttpMethod::Put, HttpMethod::Delete]
        );
        assert_eq!(item.parameters.len(), 1);
        assert_eq!(item.parameters[0].description.as_deref(), Some("Pet id"));
        assert_eq!(
            item.parameters[0].schema().map(|s| s.to_value()),
            Some(json!({"type": "string"}))
        );
        assert_eq!(item.summary.as_deref(), Some("One pet"));
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let mut paths = Paths::new();
        let err = RouteSpec::new("/x")
            .with_methods(["FETCH"])
            .register(&mut paths)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(paths.is_empty());
    }

    #[test]
    fn test_register_on_document_declares_tags() {
        let mut api = OpenApi::new(Info::new("Pets", "1.0"), Paths::new());
        RouteSpec::new("/pets")
            .with_methods(["GET", "POST"])
            .with_tag(Tag::new("pets").with_description("Pet operations"))
            .register_on(&mut api)
            .unwrap();
        RouteSpec::new("/pets/<id>")
            .with_tag_names(["pets"])
            .register_on(&mut api)
            .unwrap();

        assert_eq!(api.tags.len(), 1);
        assert_eq!(api.tags[0].description.as_deref(), Some("Pet operations"));
        let post = api
            .paths
            .get("/pets")
            .and_then(|item| item.operation(HttpMethod::Post))
            .unwrap();
        assert_eq!(post.tags, vec!["pets".to_string()]);
    }
}
