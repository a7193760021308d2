#![deny(missing_docs)]

//! # OpenAPI Document Model
//!
//! Plain data holders for every object of an OpenAPI 3 document, each
//! serialized through [`crate::model::ToDict`].

pub mod components;
pub mod content;
pub mod info;
pub mod openapi;
pub mod operation;
pub mod parameter;
pub mod paths;
pub mod server;
pub mod tag;

pub use components::{
    Components, OAuthFlow, OAuthFlows, SecurityScheme, SecuritySchemeType,
};
pub use content::{
    Encoding, Example, Header, Link, MediaType, RefOr, Reference, RequestBody, ResponseObject,
    ResponsesObject, APPLICATION_JSON, APPLICATION_XML, FORM_URLENCODED, MULTIPART_FORM_DATA,
    TEXT_PLAIN,
};
pub use info::{Contact, Info, License};
pub use openapi::{OpenApi, SharedOpenApi, DEFAULT_OPENAPI_VERSION};
pub use operation::{Callback, HttpMethod, Operation, SecurityRequirement};
pub use parameter::{Parameter, ParameterLocation, Style};
pub use paths::{PathItem, Paths};
pub use server::{Server, ServerVariable};
pub use tag::{ExternalDocumentation, Tag};
