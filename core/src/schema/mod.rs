#![deny(missing_docs)]

//! # Schemas
//!
//! - **types**: the `Schema` node and its fixed-type constructors.
//! - **factory**: type-to-schema resolution and the component registry.

pub mod factory;
pub mod types;

pub use factory::{
    Binary, BoundSpec, ClassSpec, Describe, EnumSpec, Primitive, SchemaFactory, TypeSpec,
};
pub use types::{
    AdditionalProperties, Array, Discriminator, Schema, SchemaType, Xml, SCHEMA_REF_BASE,
};
