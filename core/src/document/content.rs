#![deny(missing_docs)]

//! # Content
//!
//! Payload descriptions shared by parameters, request bodies and responses:
//! media types, examples, encodings, headers, links, and the `$ref` wrapper
//! used wherever a component may be referenced instead of inlined.

use crate::document::parameter::Style;
use crate::document::server::Server;
use crate::error::AppResult;
use crate::model::{impl_extensible, Extensions, Projection, ToDict};
use crate::schema::{Schema, SchemaFactory, TypeSpec};
use indexmap::IndexMap;
use serde_json::Value;

/// `application/json`
pub const APPLICATION_JSON: &str = "application/json";
/// `text/plain`
pub const TEXT_PLAIN: &str = "text/plain";
/// `application/xml`
pub const APPLICATION_XML: &str = "application/xml";
/// `application/x-www-form-urlencoded`
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
/// `multipart/form-data`
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// A JSON Reference into the components section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The reference target, e.g. `#/components/examples/Cat`.
    pub ref_path: String,
}

impl Reference {
    /// A reference to `#/components/<kind>/<name>`.
    pub fn component(kind: &str, name: &str) -> Self {
        Self {
            ref_path: format!("#/components/{}/{}", kind, name),
        }
    }
}

impl ToDict for Reference {
    fn project(&self, out: &mut Projection) {
        out.field("ref", &self.ref_path);
    }
}

/// Either an inline object or a reference to a component.
#[derive(Debug, Clone, PartialEq)]
pub enum RefOr<T> {
    /// A `$ref` indirection.
    Ref(Reference),
    /// The object itself.
    Item(T),
}

impl<T> RefOr<T> {
    /// A reference to `#/components/<kind>/<name>`.
    pub fn reference(kind: &str, name: &str) -> Self {
        RefOr::Ref(Reference::component(kind, name))
    }
}

impl<T> From<T> for RefOr<T> {
    fn from(value: T) -> Self {
        RefOr::Item(value)
    }
}

impl<T: ToDict> ToDict for RefOr<T> {
    fn project(&self, out: &mut Projection) {
        match self {
            RefOr::Ref(reference) => reference.project(out),
            RefOr::Item(item) => item.project(out),
        }
    }
}

/// An example value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Example {
    /// Short description.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Embedded literal example.
    pub value: Option<Value>,
    /// URL of a literal example, exclusive with `value`.
    pub external_value: Option<String>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Example {
    /// An example embedding `value`.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Sets the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

impl ToDict for Example {
    fn project(&self, out: &mut Projection) {
        out.field("summary", &self.summary)
            .field("description", &self.description)
            .field("value", &self.value)
            .field("external_value", &self.external_value)
            .extensions(&self.extensions);
    }
}

/// A response or encoding header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    /// Description.
    pub description: Option<String>,
    /// Whether the header is mandatory.
    pub required: Option<bool>,
    /// Marks the header as deprecated.
    pub deprecated: Option<bool>,
    /// Serialization style.
    pub style: Option<Style>,
    /// Explode arrays and objects.
    pub explode: Option<bool>,
    /// Schema of the header value.
    pub schema: Option<Schema>,
    /// Example value.
    pub example: Option<Value>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Header {
    /// Creates a header whose value is described by `candidate`.
    pub fn new(factory: &mut SchemaFactory, candidate: impl Into<TypeSpec>) -> AppResult<Self> {
        Ok(Self {
            schema: Some(factory.get_schema(candidate, None)?),
            ..Default::default()
        })
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl ToDict for Header {
    fn project(&self, out: &mut Projection) {
        out.field("description", &self.description)
            .field("required", &self.required)
            .field("deprecated", &self.deprecated)
            .field("style", &self.style)
            .field("explode", &self.explode)
            .model("schema", self.schema.as_ref())
            .field("example", &self.example)
            .extensions(&self.extensions);
    }
}

/// Serialization of one property of a multipart or form payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encoding {
    /// Content type of the property.
    pub content_type: Option<String>,
    /// Extra headers of a multipart part.
    pub headers: IndexMap<String, RefOr<Header>>,
    /// Serialization style.
    pub style: Option<Style>,
    /// Explode arrays and objects.
    pub explode: Option<bool>,
    /// Allow reserved characters unescaped.
    pub allow_reserved: Option<bool>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Encoding {
    /// An encoding with a content type.
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..Default::default()
        }
    }

    /// Adds a part header.
    pub fn add_header(&mut self, name: impl Into<String>, header: impl Into<RefOr<Header>>) {
        self.headers.insert(name.into(), header.into());
    }
}

impl ToDict for Encoding {
    fn project(&self, out: &mut Projection) {
        out.field("content_type", &self.content_type)
            .model_map("headers", &self.headers)
            .field("style", &self.style)
            .field("explode", &self.explode)
            .field("allow_reserved", &self.allow_reserved)
            .extensions(&self.extensions);
    }
}

/// Schema and examples for one media type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaType {
    /// Payload schema.
    pub schema: Option<Schema>,
    /// Example payload.
    pub example: Option<Value>,
    /// Named examples.
    pub examples: IndexMap<String, RefOr<Example>>,
    /// Per-property encodings.
    pub encoding: IndexMap<String, Encoding>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl MediaType {
    /// A media type with a ready schema.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema: Some(schema),
            ..Default::default()
        }
    }

    /// A media type whose schema is resolved from `candidate`.
    pub fn of(factory: &mut SchemaFactory, candidate: impl Into<TypeSpec>) -> AppResult<Self> {
        Ok(Self::new(factory.get_schema(candidate, None)?))
    }

    /// Sets the example payload.
    pub fn with_example(mut self, example: impl Into<Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Adds a named example.
    pub fn add_example(&mut self, name: impl Into<String>, example: impl Into<RefOr<Example>>) {
        self.examples.insert(name.into(), example.into());
    }

    /// Adds a property encoding.
    pub fn add_encoding(&mut self, name: impl Into<String>, encoding: Encoding) {
        self.encoding.insert(name.into(), encoding);
    }
}

impl ToDict for MediaType {
    fn project(&self, out: &mut Projection) {
        out.model("schema", self.schema.as_ref())
            .field("example", &self.example)
            .model_map("examples", &self.examples)
            .model_map("encoding", &self.encoding)
            .extensions(&self.extensions);
    }
}

/// A design-time link from a response to another operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    /// Relative or absolute reference to the target operation.
    pub operation_ref: Option<String>,
    /// `operationId` of the target operation.
    pub operation_id: Option<String>,
    /// Parameters passed to the target, as literal values or runtime expressions.
    pub parameters: IndexMap<String, Value>,
    /// Request body passed to the target.
    pub request_body: Option<Value>,
    /// Description.
    pub description: Option<String>,
    /// Server used by the target operation.
    pub server: Option<Server>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Link {
    /// A link to the operation with `operation_id`.
    pub fn to_operation(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: Some(operation_id.into()),
            ..Default::default()
        }
    }

    /// Passes a parameter to the target operation.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

impl ToDict for Link {
    fn project(&self, out: &mut Projection) {
        out.field("operation_ref", &self.operation_ref)
            .field("operation_id", &self.operation_id)
            .field("parameters", &self.parameters)
            .field("request_body", &self.request_body)
            .field("description", &self.description)
            .model("server", self.server.as_ref())
            .extensions(&self.extensions);
    }
}

/// The body of a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody {
    /// Description.
    pub description: Option<String>,
    /// Payload per media type.
    pub content: IndexMap<String, MediaType>,
    /// Whether the body is mandatory.
    pub required: Option<bool>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl RequestBody {
    /// An empty request body.
    pub fn new() -> Self {
        Self::default()
    }

    /// A body of `media_type` whose schema is resolved from `candidate`.
    pub fn of(
        factory: &mut SchemaFactory,
        media_type: &str,
        candidate: impl Into<TypeSpec>,
    ) -> AppResult<Self> {
        Ok(Self::new().with_content(media_type, MediaType::of(factory, candidate)?))
    }

    /// Adds a media type.
    pub fn with_content(mut self, media_type: impl Into<String>, content: MediaType) -> Self {
        self.content.insert(media_type.into(), content);
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets whether the body is mandatory.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }
}

impl ToDict for RequestBody {
    fn project(&self, out: &mut Projection) {
        out.field("description", &self.description)
            .model_map("content", &self.content)
            .field("required", &self.required)
            .extensions(&self.extensions);
    }
}

/// A single response of an operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseObject {
    /// Description; always emitted.
    pub description: String,
    /// Response headers.
    pub headers: IndexMap<String, RefOr<Header>>,
    /// Payload per media type.
    pub content: IndexMap<String, MediaType>,
    /// Links to other operations.
    pub links: IndexMap<String, RefOr<Link>>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl ResponseObject {
    /// A response with a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// A response of `media_type` whose schema is resolved from `candidate`.
    pub fn of(
        factory: &mut SchemaFactory,
        description: impl Into<String>,
        media_type: &str,
        candidate: impl Into<TypeSpec>,
    ) -> AppResult<Self> {
        let mut response = Self::new(description);
        response.add_content(media_type, MediaType::of(factory, candidate)?);
        Ok(response)
    }

    /// Adds a header.
    pub fn add_header(&mut self, name: impl Into<String>, header: impl Into<RefOr<Header>>) {
        self.headers.insert(name.into(), header.into());
    }

    /// Adds a media type.
    pub fn add_content(&mut self, media_type: impl Into<String>, content: MediaType) {
        self.content.insert(media_type.into(), content);
    }

    /// Adds a link.
    pub fn add_link(&mut self, name: impl Into<String>, link: impl Into<RefOr<Link>>) {
        self.links.insert(name.into(), link.into());
    }
}

impl ToDict for ResponseObject {
    fn project(&self, out: &mut Projection) {
        // `description` is required by the format, so an empty one is still written.
        out.raw("description", Value::String(self.description.clone()))
            .model_map("headers", &self.headers)
            .model_map("content", &self.content)
            .model_map("links", &self.links)
            .extensions(&self.extensions);
    }
}

/// Expected responses of an operation, keyed by status code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponsesObject {
    /// Response for codes not listed.
    pub default: Option<RefOr<ResponseObject>>,
    /// Responses by status code (`"200"`, `"4XX"`, ...).
    pub responses: IndexMap<String, RefOr<ResponseObject>>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl ResponsesObject {
    /// An empty set of responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the response for `status_code`.
    pub fn add_response(
        &mut self,
        status_code: impl Into<String>,
        response: impl Into<RefOr<ResponseObject>>,
    ) -> &mut Self {
        self.responses.insert(status_code.into(), response.into());
        self
    }

    /// Builder form of [`ResponsesObject::add_response`].
    pub fn with_response(
        mut self,
        status_code: impl Into<String>,
        response: impl Into<RefOr<ResponseObject>>,
    ) -> Self {
        self.add_response(status_code, response);
        self
    }

    /// Sets the default response.
    pub fn with_default(mut self, response: impl Into<RefOr<ResponseObject>>) -> Self {
        self.default = Some(response.into());
        self
    }

    /// Whether no response is declared.
    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.responses.is_empty()
    }
}

impl ToDict for ResponsesObject {
    fn project(&self, out: &mut Projection) {
        out.model("default", self.default.as_ref());
        for (code, response) in &self.responses {
            out.raw(code.clone(), response.to_value());
        }
        out.extensions(&self.extensions);
    }
}

impl_extensible!(
    Example,
    Header,
    Encoding,
    MediaType,
    Link,
    RequestBody,
    ResponseObject,
    ResponsesObject,
);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_response_with_json_content_and_links() {
        let mut factory = SchemaFactory::new();
        let mut response = ResponseObject::of(
            &mut factory,
            "A list of ids",
            APPLICATION_JSON,
            TypeSpec::of::<Vec<i64>>(),
        )
        .unwrap();
        response.add_link(
            "GetUser",
            Link::to_operation("getUser").with_parameter("userId", "$response.body#/0"),
        );
        response.add_header(
            "X-Rate-Limit",
            Header::new(&mut factory, TypeSpec::of::<i32>()).unwrap(),
        );
        assert_eq!(
            response.to_value(),
            json!({
                "description": "A list of ids",
                "headers": {"X-Rate-Limit": {"schema": {"type": "integer", "format": "int32"}}},
                "content": {
                    "application/json": {
                        "schema": {"type": "array", "items": {"type": "integer", "format": "int64"}}
                    }
                },
                "links": {
                    "GetUser": {
                        "operationId": "getUser",
                        "parameters": {"userId": "$response.body#/0"}
                    }
                }
            })
        );
    }

    #[test]
    fn test_responses_keep_status_codes_verbatim() {
        let responses = ResponsesObject::new()
            .with_default(ResponseObject::new("Unexpected error"))
            .with_response("200", ResponseObject::new("OK"))
            .with_response("4XX", RefOr::reference("responses", "ClientError"));
        assert_eq!(
            responses.to_value(),
            json!({
                "default": {"description": "Unexpected error"},
                "200": {"description": "OK"},
                "4XX": {"$ref": "#/components/responses/ClientError"}
            })
        );
    }

    #[test]
    fn test_media_type_examples_and_encoding() {
        let mut media = MediaType::new(Schema::object()).with_example(json!({"id": 1}));
        media.add_example("cat", Example::new(json!({"name": "Tom"})).with_summary("A cat"));
        media.add_example("dog", RefOr::reference("examples", "Dog"));
        media.add_encoding("avatar", Encoding::new("image/png"));
        assert_eq!(
            media.to_value(),
            json!({
                "schema": {"type": "object"},
                "example": {"id": 1},
                "examples": {
                    "cat": {"summary": "A cat", "value": {"name": "Tom"}},
                    "dog": {"$ref": "#/components/examples/Dog"}
                },
                "encoding": {"avatar": {"contentType": "image/png"}}
            })
        );
    }

    #[test]
    fn test_request_body_required_false_is_kept() {
        let mut factory = SchemaFactory::new();
        let body = RequestBody::of(&mut factory, TEXT_PLAIN, TypeSpec::of::<String>())
            .unwrap()
            .with_required(false);
        assert_eq!(
            body.to_value(),
            json!({"content": {"text/plain": {"schema": {"type": "string"}}}, "required": false})
        );
    }
}
