#![deny(missing_docs)]

//! # OasDoc Core
//!
//! Declarative builder for OpenAPI 3 documents.
//!
//! Application code describes endpoints, parameters and payloads with document
//! values and bound models; the crate resolves Rust types to schemas, registers
//! named components once, and projects everything into a pruned, camelCased
//! JSON tree that can be written as JSON or YAML.

/// Shared error types.
pub mod error;

/// Dictionary projection and specification extensions.
pub mod model;

/// URL, extension name and document conformance checks.
pub mod validation;

/// Schema nodes and the schema factory.
pub mod schema;

/// OpenAPI document objects.
pub mod document;

/// Declarative schema binding.
pub mod binding;

/// Route template translation and route registration.
pub mod routes;

/// Document configuration from files and the environment.
pub mod config;

pub use binding::{BoundField, Model, ModelOptions};
pub use config::DocumentConfig;
pub use document::{
    Callback, Components, Contact, Encoding, Example, ExternalDocumentation, Header, HttpMethod,
    Info, License, Link, MediaType, OAuthFlow, OAuthFlows, OpenApi, Operation, Parameter,
    ParameterLocation, PathItem, Paths, RefOr, Reference, RequestBody, ResponseObject,
    ResponsesObject, SecurityScheme, Server, ServerVariable, SharedOpenApi, Style, Tag,
};
pub use error::{AppError, AppResult};
pub use model::{camel_case, Extensible, Extensions, KeyCase, ToDict};
pub use routes::{openapi_path, path_params, RouteOptions, RouteSpec};
pub use schema::{
    AdditionalProperties, Array, Binary, Describe, Primitive, Schema, SchemaFactory, SchemaType,
    TypeSpec,
};
pub use validation::check_document;

#[doc(hidden)]
pub use serde_json;
