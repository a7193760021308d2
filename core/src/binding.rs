#![deny(missing_docs)]

//! # Declarative Schema Binding
//!
//! Describes a payload once and derives both its value struct and its schema.
//!
//! Each field of a bound model carries a [`BoundField`] made by one of the field
//! builders ([`string`], [`integer`], [`array`], [`object`], [`one_of`], ...). The
//! builder holds the field's schema node, whether it is required, and an optional
//! wire name. A field is required only when marked with [`BoundField::required`],
//! whatever its Rust type. [`Model::schema`] assembles the object:
//!
//! - properties are keyed by the wire name: the explicit name, else the camelCase
//!   form of the declared field name,
//! - `required` lists the names from [`ModelOptions`] first, then required fields in
//!   declaration order, without duplicates,
//! - `additionalProperties`, `minProperties`, `maxProperties` and `xml` come from
//!   [`ModelOptions`]; additional properties are refused unless allowed.
//!
//! Nested named types resolve through the factory, so they appear as `$ref` and are
//! registered once. A bound model registers itself the first time it is resolved.
//! Constraints set on a field of a named type wrap the reference in `allOf`.
//!
//! ```
//! use oasdoc_core::binding::{integer, string, ModelOptions};
//! use oasdoc_core::{bound_model, Model, SchemaFactory};
//!
//! bound_model! {
//!     options = ModelOptions::new().with_min_properties(1);
//!     /// A pet.
//!     pub struct Pet {
//!         pub pet_id: i64 = integer().required(),
//!         pub name: String = string().with_max_length(64),
//!         pub tag: Option<String>,
//!     }
//! }
//!
//! let pet = Pet { name: "Tom".into(), ..Default::default() };
//! assert_eq!(pet.name, "Tom");
//!
//! let mut factory = SchemaFactory::new();
//! let schema = Pet::schema(&mut factory).unwrap();
//! assert_eq!(schema.required, vec!["petId".to_string()]);
//! assert!(schema.properties.contains_key("tag"));
//! ```

use crate::error::AppResult;
use crate::model::camel_case;
use crate::schema::{AdditionalProperties, Describe, Schema, SchemaFactory, TypeSpec, Xml};
use serde_json::Value;

#[derive(Debug, Clone)]
enum Shape {
    Inline,
    Items(TypeSpec),
    Target(TypeSpec),
    OneOf(Vec<TypeSpec>),
    AllOf(Vec<TypeSpec>),
    AnyOf(Vec<TypeSpec>),
}

/// One declared field of a bound model.
#[derive(Debug, Clone)]
pub struct BoundField {
    template: Schema,
    shape: Shape,
    required: bool,
    name: Option<String>,
}

impl BoundField {
    fn inline(template: Schema) -> Self {
        Self {
            template,
            shape: Shape::Inline,
            required: false,
            name: None,
        }
    }

    fn shaped(template: Schema, shape: Shape) -> Self {
        Self {
            template,
            shape,
            required: false,
            name: None,
        }
    }

    /// A field described by the Rust type `T`.
    pub fn of<T: Describe + ?Sized>() -> Self {
        Self::shaped(Schema::new(), Shape::Target(T::type_spec()))
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets whether the field is required.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Overrides the wire name of the field.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether the field is required.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The wire name for a field declared as `declared`.
    pub fn output_name(&self, declared: &str) -> String {
        self.name.clone().unwrap_or_else(|| camel_case(declared))
    }

    /// Builds the field's schema node.
    pub fn resolve(&self, factory: &mut SchemaFactory) -> AppResult<Schema> {
        let mut schema = self.template.clone();
        match &self.shape {
            Shape::Inline => {}
            Shape::Items(item) => {
                schema.items = Some(Box::new(factory.get_schema(item.clone(), None)?));
            }
            Shape::Target(spec) => {
                let resolved = factory.get_schema(spec.clone(), None)?;
                if !resolved.is_ref() {
                    return Ok(resolved.overlay(&schema));
                }
                // A `$ref` carries nothing else, so field edits wrap it.
                if schema.is_unconstrained() {
                    return Ok(resolved);
                }
                return Ok(Schema::all_of(vec![resolved]).overlay(&schema));
            }
            Shape::OneOf(specs) => schema.one_of = resolve_all(factory, specs)?,
            Shape::AllOf(specs) => schema.all_of = resolve_all(factory, specs)?,
            Shape::AnyOf(specs) => schema.any_of = resolve_all(factory, specs)?,
        }
        Ok(schema)
    }

    fn edit(mut self, f: impl FnOnce(Schema) -> Schema) -> Self {
        self.template = f(self.template);
        self
    }

    /// Sets the description.
    pub fn with_description(self, description: impl Into<String>) -> Self {
        self.edit(|s| s.with_description(description))
    }

    /// Sets the example value.
    pub fn with_example(self, example: impl Into<Value>) -> Self {
        self.edit(|s| s.with_example(example))
    }

    /// Sets the default value.
    pub fn with_default(self, default: impl Into<Value>) -> Self {
        self.edit(|s| s.with_default(default))
    }

    /// Sets the format, unless the builder fixed one.
    pub fn with_format(self, format: impl Into<String>) -> Self {
        self.edit(|s| s.with_format(format))
    }

    /// Sets the inclusive lower bound.
    pub fn with_minimum(self, minimum: f64) -> Self {
        self.edit(|s| s.with_minimum(minimum))
    }

    /// Sets the inclusive upper bound.
    pub fn with_maximum(self, maximum: f64) -> Self {
        self.edit(|s| s.with_maximum(maximum))
    }

    /// Sets the minimum string length.
    pub fn with_min_length(self, min_length: u64) -> Self {
        self.edit(|s| s.with_min_length(min_length))
    }

    /// Sets the maximum string length.
    pub fn with_max_length(self, max_length: u64) -> Self {
        self.edit(|s| s.with_max_length(max_length))
    }

    /// Sets the string pattern.
    pub fn with_pattern(self, pattern: impl Into<String>) -> Self {
        self.edit(|s| s.with_pattern(pattern))
    }

    /// Sets the minimum array length.
    pub fn with_min_items(self, min_items: u64) -> Self {
        self.edit(|s| s.with_min_items(min_items))
    }

    /// Sets the maximum array length.
    pub fn with_max_items(self, max_items: u64) -> Self {
        self.edit(|s| s.with_max_items(max_items))
    }

    /// Requires unique array elements.
    pub fn with_unique_items(self, unique: bool) -> Self {
        self.edit(|s| s.with_unique_items(unique))
    }

    /// Restricts the allowed values.
    pub fn with_enum<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.edit(|s| s.with_enum(values))
    }

    /// Allows `null`.
    pub fn with_nullable(self, nullable: bool) -> Self {
        self.edit(|s| s.with_nullable(nullable))
    }

    /// Marks the field as sent in responses only.
    pub fn with_read_only(self, read_only: bool) -> Self {
        self.edit(|s| s.with_read_only(read_only))
    }

    /// Marks the field as sent in requests only.
    pub fn with_write_only(self, write_only: bool) -> Self {
        self.edit(|s| s.with_write_only(write_only))
    }

    /// Marks the field as deprecated.
    pub fn with_deprecated(self, deprecated: bool) -> Self {
        self.edit(|s| s.with_deprecated(deprecated))
    }
}

fn resolve_all(factory: &mut SchemaFactory, specs: &[TypeSpec]) -> AppResult<Vec<Schema>> {
    specs
        .iter()
        .map(|spec| factory.get_schema(spec.clone(), None))
        .collect()
}

/// A `string` field.
pub fn string() -> BoundField {
    BoundField::inline(Schema::string())
}

/// A `string` / `email` field.
pub fn email() -> BoundField {
    BoundField::inline(Schema::email())
}

/// A `string` / `binary` field.
pub fn binary() -> BoundField {
    BoundField::inline(Schema::binary())
}

/// An `integer` / `int32` field.
pub fn integer() -> BoundField {
    BoundField::inline(Schema::integer())
}

/// An `integer` / `int64` field.
pub fn int64() -> BoundField {
    BoundField::inline(Schema::int64())
}

/// A `number` field.
pub fn number() -> BoundField {
    BoundField::inline(Schema::number())
}

/// A `boolean` field.
pub fn boolean() -> BoundField {
    BoundField::inline(Schema::boolean())
}

/// An array field whose elements are described by `item`.
pub fn array(item: impl Into<TypeSpec>) -> BoundField {
    BoundField::shaped(Schema::array(Schema::new()), Shape::Items(item.into()))
}

/// An array field of `T`.
pub fn array_of<T: Describe + ?Sized>() -> BoundField {
    array(T::type_spec())
}

/// A field holding a model, struct or enum `T`; named types yield a `$ref`.
pub fn object<T: Describe + ?Sized>() -> BoundField {
    BoundField::shaped(Schema::new(), Shape::Target(T::type_spec()))
}

/// A field matching exactly one of `types`.
pub fn one_of(types: Vec<TypeSpec>) -> BoundField {
    BoundField::shaped(Schema::new(), Shape::OneOf(types))
}

/// A field matching all of `types`.
pub fn all_of(types: Vec<TypeSpec>) -> BoundField {
    BoundField::shaped(Schema::new(), Shape::AllOf(types))
}

/// A field matching at least one of `types`.
pub fn any_of(types: Vec<TypeSpec>) -> BoundField {
    BoundField::shaped(Schema::new(), Shape::AnyOf(types))
}

/// Object-level settings of a bound model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOptions {
    /// Policy for undeclared properties; refused by default.
    pub additional_properties: Option<AdditionalProperties>,
    /// Extra required names, in wire-name space, listed before the fields' own.
    pub required: Vec<String>,
    /// Minimum number of properties.
    pub min_properties: Option<u64>,
    /// Maximum number of properties.
    pub max_properties: Option<u64>,
    /// XML hints.
    pub xml: Option<Xml>,
    /// Description of the object.
    pub description: Option<String>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            additional_properties: Some(AdditionalProperties::Allowed(false)),
            required: Vec::new(),
            min_properties: None,
            max_properties: None,
            xml: None,
            description: None,
        }
    }
}

impl ModelOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy for undeclared properties.
    pub fn with_additional_properties(mut self, value: impl Into<AdditionalProperties>) -> Self {
        self.additional_properties = Some(value.into());
        self
    }

    /// Allows undeclared properties.
    pub fn allow_additional_properties(self) -> Self {
        self.with_additional_properties(true)
    }

    /// Adds a required wire name.
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Sets the minimum number of properties.
    pub fn with_min_properties(mut self, min_properties: u64) -> Self {
        self.min_properties = Some(min_properties);
        self
    }

    /// Sets the maximum number of properties.
    pub fn with_max_properties(mut self, max_properties: u64) -> Self {
        self.max_properties = Some(max_properties);
        self
    }

    /// Sets XML hints.
    pub fn with_xml(mut self, xml: Xml) -> Self {
        self.xml = Some(xml);
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A payload type described by bound fields.
///
/// Usually implemented by [`bound_model!`](crate::bound_model).
pub trait Model {
    /// Component name.
    fn model_name() -> &'static str;

    /// Module path of the declaring type, qualifying the component name.
    fn module_path() -> &'static str;

    /// Declared fields, in declaration order.
    fn fields() -> Vec<(&'static str, BoundField)>;

    /// Object-level settings.
    fn options() -> ModelOptions {
        ModelOptions::default()
    }

    /// Builds the inline object schema.
    fn schema(factory: &mut SchemaFactory) -> AppResult<Schema> {
        build_object(factory, Self::fields(), Self::options())
    }
}

/// Assembles an object schema from bound fields.
pub fn build_object(
    factory: &mut SchemaFactory,
    fields: Vec<(&'static str, BoundField)>,
    options: ModelOptions,
) -> AppResult<Schema> {
    let mut schema = Schema::object();
    let mut required = options.required;
    for (declared, field) in fields {
        let name = field.output_name(declared);
        let node = field.resolve(factory)?;
        if field.is_required() {
            required.push(name.clone());
        }
        schema.properties.insert(name, node);
    }
    for name in required {
        schema = schema.with_required(name);
    }
    schema.additional_properties = options.additional_properties;
    schema.min_properties = options.min_properties;
    schema.max_properties = options.max_properties;
    schema.xml = options.xml;
    schema.description = options.description;
    Ok(schema)
}

#[doc(hidden)]
#[macro_export]
macro_rules! __bound_field {
    ($ty:ty) => {
        $crate::binding::BoundField::of::<$ty>()
    };
    ($ty:ty, $builder:expr) => {
        $builder
    };
}

/// Declares a bound model: the value struct plus its [`Model`] and
/// [`Describe`](crate::schema::Describe) implementations.
///
/// A field written `name: Type = builder` uses the builder; a bare `name: Type`
/// is described by its Rust type. The struct derives `Debug`, `Clone` and `Default`;
/// build values with a struct literal and `..Default::default()`.
/// An optional leading `options = expr;` supplies [`ModelOptions`].
#[macro_export]
macro_rules! bound_model {
    (
        @model [$($options:expr)?]
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty $(= $builder:expr)? ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty ),*
        }

        impl $crate::binding::Model for $name {
            fn model_name() -> &'static str {
                stringify!($name)
            }

            fn module_path() -> &'static str {
                module_path!()
            }

            fn fields() -> ::std::vec::Vec<(&'static str, $crate::binding::BoundField)> {
                #[allow(unused_imports)]
                use $crate::binding::*;
                ::std::vec![
                    $( (stringify!($field), $crate::__bound_field!($ty $(, $builder)?)) ),*
                ]
            }

            $(
                fn options() -> $crate::binding::ModelOptions {
                    #[allow(unused_imports)]
                    use $crate::binding::*;
                    $options
                }
            )?
        }

        impl $crate::schema::Describe for $name {
            fn type_spec() -> $crate::schema::TypeSpec {
                $crate::schema::TypeSpec::Bound($crate::schema::BoundSpec {
                    name: stringify!($name),
                    module: module_path!(),
                    build: <$name as $crate::binding::Model>::schema,
                })
            }
        }
    };
    (options = $options:expr; $($rest:tt)*) => {
        $crate::bound_model!(@model [$options] $($rest)*);
    };
    ($($rest:tt)*) => {
        $crate::bound_model!(@model [] $($rest)*);
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ToDict;
    use crate::{bound_model, reflect_enum};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    reflect_enum! {
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub enum Status {
            Available = "available",
            Sold = "sold",
        }
    }

    bound_model! {
        /// Owner of a pet.
        pub struct Owner {
            pub full_name: String = string().required(),
            pub contact_email: String = email().with_name("email"),
        }
    }

    bound_model! {
        options = ModelOptions::new()
            .with_required("kind")
            .with_min_properties(1)
            .with_xml(Xml::named("pet"));
        /// A pet.
        pub struct Pet {
            pub pet_id: i64 = int64().required(),
            pub kind: String = string().required().with_enum(["cat", "dog"]),
            pub photo_urls: Vec<String> = array_of::<String>().with_min_items(1),
            pub status: Option<Status> = object::<Status>(),
            pub owner: Option<Owner>,
            pub weight: f64 = number().with_minimum(0.0),
            pub vaccinated: bool = boolean().with_name("is_vaccinated"),
        }
    }

    bound_model! {
        options = ModelOptions::new().allow_additional_properties();
        pub struct Category {
            pub name: String,
            pub parent: Option<Box<Category>>,
        }
    }

    #[test]
    fn test_value_struct_defaults() {
        let pet = Pet {
            pet_id: 7,
            ..Default::default()
        };
        assert_eq!(pet.pet_id, 7);
        assert!(pet.owner.is_none());
        assert_eq!(Status::Sold.value(), json!("sold"));
    }

    #[test]
    fn test_bound_model_schema() {
        let mut factory = SchemaFactory::new();
        let schema = Pet::schema(&mut factory).unwrap();
        assert_eq!(
            schema.to_value(),
            json!({
                "type": "object",
                "minProperties": 1,
                "required": ["kind", "petId"],
                "properties": {
                    "petId": {"type": "integer", "format": "int64"},
                    "kind": {"type": "string", "enum": ["cat", "dog"]},
                    "photoUrls": {"type": "array", "minItems": 1, "items": {"type": "string"}},
                    "status": {"type": "string", "enum": ["available", "sold"]},
                    "owner": {"$ref": "#/components/schemas/Owner"},
                    "weight": {"type": "number", "minimum": 0},
                    "is_vaccinated": {"type": "boolean"}
                },
                "additionalProperties": false,
                "xml": {"name": "pet"}
            })
        );
        let owner = factory.get("Owner").unwrap();
        assert_eq!(
            owner.to_value(),
            json!({
                "type": "object",
                "required": ["fullName"],
                "properties": {
                    "fullName": {"type": "string"},
                    "email": {"type": "string", "format": "email"}
                },
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn test_bound_model_registers_on_first_resolution() {
        let mut factory = SchemaFactory::new();
        let first = factory.schema_of::<Pet>().unwrap();
        let second = factory.schema_of::<Pet>().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.ref_path.as_deref(), Some("#/components/schemas/Pet"));
        assert_eq!(factory.len(), 2);
        assert!(factory.contains("Owner"));
    }

    #[test]
    fn test_self_referencing_model_terminates() {
        let mut factory = SchemaFactory::new();
        factory.schema_of::<Category>().unwrap();
        let category = factory.get("Category").unwrap();
        assert_eq!(
            category.properties["parent"].ref_path.as_deref(),
            Some("#/components/schemas/Category")
        );
        assert!(category.required.is_empty());
        assert_eq!(
            category.to_dict()["additionalProperties"],
            json!(true)
        );
    }

    #[test]
    fn test_composition_fields() {
        let mut factory = SchemaFactory::new();
        let field = one_of(vec![TypeSpec::of::<Owner>(), TypeSpec::of::<String>()])
            .with_description("Who");
        assert_eq!(
            field.resolve(&mut factory).unwrap().to_value(),
            json!({
                "oneOf": [{"$ref": "#/components/schemas/Owner"}, {"type": "string"}],
                "description": "Who"
            })
        );
    }

    #[test]
    fn test_fixed_format_survives_field_edits() {
        let mut factory = SchemaFactory::new();
        let field = email().with_format("uri");
        assert_eq!(
            field.resolve(&mut factory).unwrap().format(),
            Some("email")
        );
    }

    #[test]
    fn test_output_names() {
        assert_eq!(string().output_name("created_at"), "createdAt");
        assert_eq!(string().with_name("ts").output_name("created_at"), "ts");
        assert!(!BoundField::of::<String>().is_required());
        assert!(BoundField::of::<String>().required().is_required());
    }

    #[test]
    fn test_type_described_field_keeps_its_constraints() {
        let mut factory = SchemaFactory::new();
        let text = BoundField::of::<String>()
            .with_max_length(5)
            .with_pattern("^a");
        assert_eq!(
            text.resolve(&mut factory).unwrap().to_value(),
            json!({"type": "string", "maxLength": 5, "pattern": "^a"})
        );

        let status = object::<Status>()
            .with_nullable(true)
            .with_default("available");
        assert_eq!(
            status.resolve(&mut factory).unwrap().to_value(),
            json!({
                "type": "string",
                "enum": ["available", "sold"],
                "default": "available",
                "nullable": true
            })
        );
    }

    #[test]
    fn test_constrained_reference_is_wrapped() {
        let mut factory = SchemaFactory::new();
        let plain = object::<Owner>().with_description("Ignored on a bare $ref");
        assert_eq!(
            plain.resolve(&mut factory).unwrap().to_value(),
            json!({"$ref": "#/components/schemas/Owner"})
        );

        let field = object::<Owner>()
            .with_nullable(true)
            .with_description("Current owner");
        assert_eq!(
            field.resolve(&mut factory).unwrap().to_value(),
            json!({
                "allOf": [{"$ref": "#/components/schemas/Owner"}],
                "description": "Current owner",
                "nullable": true
            })
        );
        assert_eq!(factory.len(), 1);
    }

    #[test]
    fn test_model_options_reach_the_schema() {
        assert_eq!(
            Pet::options().required,
            vec!["kind".to_string()]
        );
        assert_eq!(Owner::options(), ModelOptions::default());
        assert_eq!(
            Category::options().additional_properties,
            Some(AdditionalProperties::Allowed(true))
        );
    }
}
