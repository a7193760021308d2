#![deny(missing_docs)]

//! # Schema Types
//!
//! The JSON Schema node used throughout the document, and the constructors that
//! fix its `type` / `format` discriminant.
//!
//! `Schema::string()`, `Schema::integer()` and friends set the discriminant at
//! construction; it is private and cannot be overwritten afterwards. Formats
//! fixed by a constructor (`email`, `int64`, `binary`, ...) are likewise locked.

use crate::document::ExternalDocumentation;
use crate::error::{AppError, AppResult};
use crate::model::{impl_extensible, Extensions, Project, Projection, ToDict};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

/// Base path of schema component references.
pub const SCHEMA_REF_BASE: &str = "#/components/schemas";

/// The JSON Schema `type` discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer`
    Integer,
    /// `boolean`
    Boolean,
    /// `array`
    Array,
    /// `object`
    Object,
    /// `null`
    Null,
}

impl SchemaType {
    /// The serialized name of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::Null => "null",
        }
    }

    /// Infers the type of a literal JSON value.
    pub fn of_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(SchemaType::Boolean),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(SchemaType::Integer),
            Value::Number(_) => Some(SchemaType::Number),
            Value::String(_) => Some(SchemaType::String),
            Value::Array(_) => Some(SchemaType::Array),
            Value::Object(_) => Some(SchemaType::Object),
        }
    }
}

impl Project for SchemaType {
    fn to_json(&self) -> Value {
        Value::String(self.as_str().to_string())
    }
}

/// Value of `additionalProperties`: a flag or a schema for the extra values.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    /// `true` allows any extra property, `false` forbids them.
    Allowed(bool),
    /// Extra properties must match this schema.
    Schema(Box<Schema>),
}

impl From<bool> for AdditionalProperties {
    fn from(value: bool) -> Self {
        AdditionalProperties::Allowed(value)
    }
}

impl From<Schema> for AdditionalProperties {
    fn from(value: Schema) -> Self {
        AdditionalProperties::Schema(Box::new(value))
    }
}

impl Project for AdditionalProperties {
    fn to_json(&self) -> Value {
        match self {
            AdditionalProperties::Allowed(b) => Value::Bool(*b),
            AdditionalProperties::Schema(s) => s.to_value(),
        }
    }

    fn project(&self) -> Option<Value> {
        Some(self.to_json())
    }
}

/// Hint for polymorphic payloads (`oneOf` / `anyOf`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discriminator {
    /// Name of the property holding the discriminating value.
    pub property_name: String,
    /// Payload values mapped to schema names or references.
    pub mapping: IndexMap<String, String>,
}

impl Discriminator {
    /// Creates a discriminator on `property_name`.
    pub fn new(property_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            mapping: IndexMap::new(),
        }
    }

    /// Maps a payload value to a schema.
    pub fn with_mapping(mut self, value: impl Into<String>, schema: impl Into<String>) -> Self {
        self.mapping.insert(value.into(), schema.into());
        self
    }
}

impl ToDict for Discriminator {
    fn project(&self, out: &mut Projection) {
        out.field("property_name", &self.property_name)
            .field("mapping", &self.mapping);
    }
}

/// XML representation hints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Xml {
    /// Element or attribute name.
    pub name: Option<String>,
    /// Absolute namespace URI.
    pub namespace: Option<String>,
    /// Namespace prefix.
    pub prefix: Option<String>,
    /// Serialize as an attribute instead of an element.
    pub attribute: Option<bool>,
    /// Wrap array items in an enclosing element.
    pub wrapped: Option<bool>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Xml {
    /// Creates XML hints with an element name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Sets the namespace URI.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the namespace prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Marks the node as an XML attribute.
    pub fn with_attribute(mut self, attribute: bool) -> Self {
        self.attribute = Some(attribute);
        self
    }

    /// Marks an array as wrapped.
    pub fn with_wrapped(mut self, wrapped: bool) -> Self {
        self.wrapped = Some(wrapped);
        self
    }
}

impl ToDict for Xml {
    fn project(&self, out: &mut Projection) {
        out.field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("prefix", &self.prefix)
            .field("attribute", &self.attribute)
            .field("wrapped", &self.wrapped)
            .extensions(&self.extensions);
    }
}

/// A JSON Schema node.
///
/// A schema with `ref_path` set serializes as `{"$ref": ...}` and nothing else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    schema_type: Option<SchemaType>,
    format: Option<String>,
    format_locked: bool,
    /// Reference to a component (`#/components/schemas/Name`).
    pub ref_path: Option<String>,
    /// Short title.
    pub title: Option<String>,
    /// Numeric values must be a multiple of this.
    pub multiple_of: Option<f64>,
    /// Inclusive upper bound, exclusive when `exclusive_maximum` is set.
    pub maximum: Option<f64>,
    /// Makes `maximum` exclusive.
    pub exclusive_maximum: Option<bool>,
    /// Inclusive lower bound, exclusive when `exclusive_minimum` is set.
    pub minimum: Option<f64>,
    /// Makes `minimum` exclusive.
    pub exclusive_minimum: Option<bool>,
    /// Maximum string length.
    pub max_length: Option<u64>,
    /// Minimum string length.
    pub min_length: Option<u64>,
    /// ECMA 262 pattern for strings.
    pub pattern: Option<String>,
    /// Maximum array length.
    pub max_items: Option<u64>,
    /// Minimum array length.
    pub min_items: Option<u64>,
    /// Array elements must be unique.
    pub unique_items: Option<bool>,
    /// Maximum number of object properties.
    pub max_properties: Option<u64>,
    /// Minimum number of object properties.
    pub min_properties: Option<u64>,
    /// Names of required properties, in output-name space.
    pub required: Vec<String>,
    /// Allowed values, in declaration order.
    pub enum_values: Vec<Value>,
    /// Must match all of these.
    pub all_of: Vec<Schema>,
    /// Must match exactly one of these.
    pub one_of: Vec<Schema>,
    /// Must match at least one of these.
    pub any_of: Vec<Schema>,
    /// Must not match this.
    pub not: Option<Box<Schema>>,
    /// Element schema of an array.
    pub items: Option<Box<Schema>>,
    /// Object properties, in insertion order.
    pub properties: IndexMap<String, Schema>,
    /// Policy for properties not listed in `properties`.
    pub additional_properties: Option<AdditionalProperties>,
    /// Free text description.
    pub description: Option<String>,
    /// Default value.
    pub default: Option<Value>,
    /// Allows `null` in addition to the declared type.
    pub nullable: Option<bool>,
    /// Polymorphism hint.
    pub discriminator: Option<Discriminator>,
    /// Sent in responses only.
    pub read_only: Option<bool>,
    /// Sent in requests only.
    pub write_only: Option<bool>,
    /// XML representation hints.
    pub xml: Option<Xml>,
    /// Additional external documentation.
    pub external_docs: Option<ExternalDocumentation>,
    /// Example instance.
    pub example: Option<Value>,
    /// Marks the schema as deprecated.
    pub deprecated: Option<bool>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl_extensible!(Schema, Xml);

impl Schema {
    /// An untyped schema (composition-only, or anything).
    pub fn new() -> Self {
        Self::default()
    }

    fn typed(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Default::default()
        }
    }

    fn formatted(schema_type: SchemaType, format: &str) -> Self {
        Self {
            schema_type: Some(schema_type),
            format: Some(format.to_string()),
            format_locked: true,
            ..Default::default()
        }
    }

    /// `{"type": "string"}`
    pub fn string() -> Self {
        Self::typed(SchemaType::String)
    }

    /// `{"type": "string", "format": "email"}`
    pub fn email() -> Self {
        Self::formatted(SchemaType::String, "email")
    }

    /// `{"type": "string", "format": "binary"}`
    pub fn binary() -> Self {
        Self::formatted(SchemaType::String, "binary")
    }

    /// `{"type": "string", "format": "base64"}`
    pub fn base64() -> Self {
        Self::formatted(SchemaType::String, "base64")
    }

    /// `{"type": "integer", "format": "int32"}`
    ///
    /// The default integer format is not locked: `with_format("int64")` may widen it.
    pub fn integer() -> Self {
        Self {
            format: Some("int32".to_string()),
            ..Self::typed(SchemaType::Integer)
        }
    }

    /// `{"type": "integer", "format": "int64"}`
    pub fn int64() -> Self {
        Self::formatted(SchemaType::Integer, "int64")
    }

    /// `{"type": "number"}`
    pub fn number() -> Self {
        Self::typed(SchemaType::Number)
    }

    /// `{"type": "boolean"}`
    pub fn boolean() -> Self {
        Self::typed(SchemaType::Boolean)
    }

    /// `{"type": "object"}`
    pub fn object() -> Self {
        Self::typed(SchemaType::Object)
    }

    /// `{"type": "null"}`
    pub fn null() -> Self {
        Self::typed(SchemaType::Null)
    }

    /// `{"type": "array", "items": ...}`
    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed(SchemaType::Array)
        }
    }

    /// Reference to a schema component by bare name.
    pub fn reference(name: &str) -> Self {
        Self::from_ref(format!("{}/{}", SCHEMA_REF_BASE, name))
    }

    /// Reference by full JSON pointer.
    pub fn from_ref(path: impl Into<String>) -> Self {
        Self {
            ref_path: Some(path.into()),
            ..Default::default()
        }
    }

    /// `{"oneOf": [...]}`
    pub fn one_of(schemas: Vec<Schema>) -> Self {
        Self {
            one_of: schemas,
            ..Default::default()
        }
    }

    /// `{"allOf": [...]}`
    pub fn all_of(schemas: Vec<Schema>) -> Self {
        Self {
            all_of: schemas,
            ..Default::default()
        }
    }

    /// `{"anyOf": [...]}`
    pub fn any_of(schemas: Vec<Schema>) -> Self {
        Self {
            any_of: schemas,
            ..Default::default()
        }
    }

    /// The fixed type discriminant, if any.
    pub fn schema_type(&self) -> Option<SchemaType> {
        self.schema_type
    }

    /// The format, if any.
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Whether this schema is a `$ref` indirection.
    pub fn is_ref(&self) -> bool {
        self.ref_path.is_some()
    }

    /// Whether nothing but a description was set.
    pub(crate) fn is_unconstrained(&self) -> bool {
        let mut bare = self.clone();
        bare.description = None;
        bare == Schema::default()
    }

    /// Copies every attribute set on `edits` onto this schema.
    ///
    /// Type and `$ref` are left alone; a locked format is kept.
    pub(crate) fn overlay(mut self, edits: &Schema) -> Self {
        if let Some(format) = &edits.format {
            self = self.with_format(format.clone());
        }
        take(&mut self.title, &edits.title);
        take(&mut self.multiple_of, &edits.multiple_of);
        take(&mut self.maximum, &edits.maximum);
        take(&mut self.exclusive_maximum, &edits.exclusive_maximum);
        take(&mut self.minimum, &edits.minimum);
        take(&mut self.exclusive_minimum, &edits.exclusive_minimum);
        take(&mut self.max_length, &edits.max_length);
        take(&mut self.min_length, &edits.min_length);
        take(&mut self.pattern, &edits.pattern);
        take(&mut self.max_items, &edits.max_items);
        take(&mut self.min_items, &edits.min_items);
        take(&mut self.unique_items, &edits.unique_items);
        take(&mut self.max_properties, &edits.max_properties);
        take(&mut self.min_properties, &edits.min_properties);
        take(&mut self.not, &edits.not);
        take(&mut self.additional_properties, &edits.additional_properties);
        take(&mut self.description, &edits.description);
        take(&mut self.default, &edits.default);
        take(&mut self.nullable, &edits.nullable);
        take(&mut self.discriminator, &edits.discriminator);
        take(&mut self.read_only, &edits.read_only);
        take(&mut self.write_only, &edits.write_only);
        take(&mut self.xml, &edits.xml);
        take(&mut self.external_docs, &edits.external_docs);
        take(&mut self.example, &edits.example);
        take(&mut self.deprecated, &edits.deprecated);
        if !edits.enum_values.is_empty() {
            self.enum_values = edits.enum_values.clone();
        }
        for name in &edits.required {
            self = self.with_required(name.clone());
        }
        let mut extensions = edits.extensions.clone();
        extensions.merge(&self.extensions);
        self.extensions = extensions;
        self
    }

    /// Sets the format unless the constructor locked it.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        let format = format.into();
        if self.format_locked {
            warn!(
                locked = self.format.as_deref().unwrap_or_default(),
                requested = %format,
                "Ignoring format override on a fixed-format schema"
            );
            return self;
        }
        self.format = Some(format);
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the example.
    pub fn with_example(mut self, example: impl Into<Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sets the lower bound.
    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Sets the upper bound.
    pub fn with_maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Makes the lower bound exclusive.
    pub fn with_exclusive_minimum(mut self, exclusive: bool) -> Self {
        self.exclusive_minimum = Some(exclusive);
        self
    }

    /// Makes the upper bound exclusive.
    pub fn with_exclusive_maximum(mut self, exclusive: bool) -> Self {
        self.exclusive_maximum = Some(exclusive);
        self
    }

    /// Sets `multipleOf`.
    pub fn with_multiple_of(mut self, multiple_of: f64) -> Self {
        self.multiple_of = Some(multiple_of);
        self
    }

    /// Sets the minimum string length.
    pub fn with_min_length(mut self, min_length: u64) -> Self {
        self.min_length = Some(min_length);
        self
    }

    /// Sets the maximum string length.
    pub fn with_max_length(mut self, max_length: u64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Sets the string pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Sets the minimum array length.
    pub fn with_min_items(mut self, min_items: u64) -> Self {
        self.min_items = Some(min_items);
        self
    }

    /// Sets the maximum array length.
    pub fn with_max_items(mut self, max_items: u64) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Requires unique array elements.
    pub fn with_unique_items(mut self, unique: bool) -> Self {
        self.unique_items = Some(unique);
        self
    }

    /// Sets the minimum property count.
    pub fn with_min_properties(mut self, min_properties: u64) -> Self {
        self.min_properties = Some(min_properties);
        self
    }

    /// Sets the maximum property count.
    pub fn with_max_properties(mut self, max_properties: u64) -> Self {
        self.max_properties = Some(max_properties);
        self
    }

    /// Sets the allowed values.
    pub fn with_enum<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a property, replacing any previous one with the same name.
    pub fn with_property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Marks a property as required; duplicates are ignored.
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    /// Sets `additionalProperties`.
    pub fn with_additional_properties(mut self, value: impl Into<AdditionalProperties>) -> Self {
        self.additional_properties = Some(value.into());
        self
    }

    /// Sets `nullable`.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    /// Sets `readOnly`.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = Some(read_only);
        self
    }

    /// Sets `writeOnly`.
    pub fn with_write_only(mut self, write_only: bool) -> Self {
        self.write_only = Some(write_only);
        self
    }

    /// Sets `deprecated`.
    pub fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    /// Sets XML hints.
    pub fn with_xml(mut self, xml: Xml) -> Self {
        self.xml = Some(xml);
        self
    }

    /// Sets the discriminator.
    pub fn with_discriminator(mut self, discriminator: Discriminator) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    /// Sets external documentation.
    pub fn with_external_docs(mut self, docs: ExternalDocumentation) -> Self {
        self.external_docs = Some(docs);
        self
    }

    /// Sets `not`.
    pub fn with_not(mut self, schema: Schema) -> Self {
        self.not = Some(Box::new(schema));
        self
    }
}

/// Replaces `slot` with `edit` when `edit` is set.
fn take<T: Clone>(slot: &mut Option<T>, edit: &Option<T>) {
    if edit.is_some() {
        slot.clone_from(edit);
    }
}

impl ToDict for Schema {
    fn project(&self, out: &mut Projection) {
        if let Some(path) = &self.ref_path {
            out.field("ref", path);
            return;
        }
        out.field("title", &self.title)
            .field("type", &self.schema_type)
            .field("format", &self.format)
            .field("multiple_of", &self.multiple_of)
            .field("maximum", &self.maximum)
            .field("exclusive_maximum", &self.exclusive_maximum)
            .field("minimum", &self.minimum)
            .field("exclusive_minimum", &self.exclusive_minimum)
            .field("max_length", &self.max_length)
            .field("min_length", &self.min_length)
            .field("pattern", &self.pattern)
            .field("max_items", &self.max_items)
            .field("min_items", &self.min_items)
            .field("unique_items", &self.unique_items)
            .field("max_properties", &self.max_properties)
            .field("min_properties", &self.min_properties)
            .field("required", &self.required)
            .field("enum", &self.enum_values)
            .models("all_of", &self.all_of)
            .models("one_of", &self.one_of)
            .models("any_of", &self.any_of)
            .model("not", self.not.as_deref());
        // `items` is emitted even when it accepts anything.
        if let Some(items) = &self.items {
            out.raw("items", items.to_value());
        }
        out.model_map("properties", &self.properties)
            .field("additional_properties", &self.additional_properties)
            .field("description", &self.description)
            .field("default", &self.default)
            .field("nullable", &self.nullable)
            .model("discriminator", self.discriminator.as_ref())
            .field("read_only", &self.read_only)
            .field("write_only", &self.write_only)
            .model("xml", self.xml.as_ref())
            .model("external_docs", self.external_docs.as_ref())
            .field("example", &self.example)
            .field("deprecated", &self.deprecated)
            .extensions(&self.extensions);
    }
}

/// Builder for array schemas; `build` fails when no `items` were given.
#[derive(Debug, Clone, Default)]
pub struct Array {
    items: Option<Schema>,
    min_items: Option<u64>,
    max_items: Option<u64>,
    unique_items: Option<bool>,
    description: Option<String>,
}

impl Array {
    /// Starts an array schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the element schema.
    pub fn items(mut self, items: Schema) -> Self {
        self.items = Some(items);
        self
    }

    /// Sets the minimum length.
    pub fn min_items(mut self, min_items: u64) -> Self {
        self.min_items = Some(min_items);
        self
    }

    /// Sets the maximum length.
    pub fn max_items(mut self, max_items: u64) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Requires unique elements.
    pub fn unique_items(mut self, unique: bool) -> Self {
        self.unique_items = Some(unique);
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Produces the schema.
    pub fn build(self) -> AppResult<Schema> {
        let items = self.items.ok_or_else(|| {
            AppError::Validation("items must be specified for Array schema".into())
        })?;
        let mut schema = Schema::array(items);
        schema.min_items = self.min_items;
        schema.max_items = self.max_items;
        schema.unique_items = self.unique_items;
        schema.description = self.description;
        Ok(schema)
    }
}
