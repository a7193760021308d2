#![deny(missing_docs)]

//! # Schema Factory
//!
//! Converts type descriptions into `Schema` values or `$ref` indirections.
//!
//! Rust has no runtime reflection, so a candidate is described by a [`TypeSpec`]:
//! either built by hand, derived from a Rust type through [`Describe`], or produced
//! by the `reflect_struct!` / `reflect_enum!` / `bound_model!` macros.
//!
//! Named types (reflected structs and bound models) are registered in the factory's
//! component registry exactly once. The registry slot is reserved *before* the type's
//! fields are walked, so a type that refers to itself resolves to a `$ref` instead of
//! recursing forever.

use crate::error::{AppError, AppResult};
use crate::schema::types::{Schema, SchemaType, SCHEMA_REF_BASE};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use tracing::debug;

/// Built-in scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// `string`
    String,
    /// `integer` / `int32`
    Integer,
    /// `integer` / `int64`
    Int64,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `string` / `binary`
    Binary,
    /// Bare `object`
    Object,
    /// Untyped schema, accepts anything.
    Any,
}

impl Primitive {
    /// A fresh schema for the primitive.
    pub fn schema(self) -> Schema {
        match self {
            Primitive::String => Schema::string(),
            Primitive::Integer => Schema::integer(),
            Primitive::Int64 => Schema::int64(),
            Primitive::Number => Schema::number(),
            Primitive::Boolean => Schema::boolean(),
            Primitive::Binary => Schema::binary(),
            Primitive::Object => Schema::object(),
            Primitive::Any => Schema::new(),
        }
    }
}

/// A closed set of values declared by a named enum.
#[derive(Debug, Clone, Copy)]
pub struct EnumSpec {
    /// Bare type name.
    pub name: &'static str,
    /// Module path of the declaring type.
    pub module: &'static str,
    /// Member values in declaration order.
    pub values: fn() -> Vec<Value>,
}

/// A struct whose fields are listed for schema discovery.
#[derive(Debug, Clone, Copy)]
pub struct ClassSpec {
    /// Bare type name, used as the component name.
    pub name: &'static str,
    /// Module path of the declaring type.
    pub module: &'static str,
    /// Field names and their type descriptions, in declaration order.
    ///
    /// Evaluated lazily so a struct may refer to itself.
    pub fields: fn() -> Vec<(&'static str, TypeSpec)>,
}

/// A type carrying its own pre-built schema (declarative binding).
#[derive(Debug, Clone, Copy)]
pub struct BoundSpec {
    /// Bare type name, used as the component name.
    pub name: &'static str,
    /// Module path of the declaring type.
    pub module: &'static str,
    /// Builds the object schema; nested named types resolve through the same factory.
    pub build: fn(&mut SchemaFactory) -> AppResult<Schema>,
}

/// Description of a candidate handed to [`SchemaFactory::get_schema`].
#[derive(Debug, Clone)]
pub enum TypeSpec {
    /// A ready schema, returned as is.
    Schema(Schema),
    /// A literal mapping of property names to candidates; becomes an inline object.
    Mapping(Vec<(String, TypeSpec)>),
    /// A literal one-element example sequence; becomes an array of the element.
    Sequence(Box<TypeSpec>),
    /// A built-in scalar.
    Primitive(Primitive),
    /// A homogeneous list.
    List(Box<TypeSpec>),
    /// A homogeneous set.
    Set(Box<TypeSpec>),
    /// A map with keys and values of the given kinds.
    Dict(Box<TypeSpec>, Box<TypeSpec>),
    /// An optional value; resolves to the inner candidate.
    Optional(Box<TypeSpec>),
    /// A named enum.
    Enum(EnumSpec),
    /// A bound model.
    Bound(BoundSpec),
    /// A reflected struct.
    Class(ClassSpec),
    /// A type no rule applies to.
    Opaque(&'static str),
}

impl TypeSpec {
    /// The description of a Rust type.
    pub fn of<T: Describe + ?Sized>() -> Self {
        T::type_spec()
    }

    /// A literal mapping candidate.
    pub fn mapping<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, TypeSpec)>,
        K: Into<String>,
    {
        TypeSpec::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// A literal one-element sequence candidate.
    pub fn sequence(element: TypeSpec) -> Self {
        TypeSpec::Sequence(Box::new(element))
    }

    /// Whether the candidate was declared optional.
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeSpec::Optional(_))
    }
}

impl From<Schema> for TypeSpec {
    fn from(value: Schema) -> Self {
        TypeSpec::Schema(value)
    }
}

impl From<Primitive> for TypeSpec {
    fn from(value: Primitive) -> Self {
        TypeSpec::Primitive(value)
    }
}

/// Maps a Rust type to its schema description.
pub trait Describe {
    /// The type's description.
    fn type_spec() -> TypeSpec;
}

macro_rules! describe_primitive {
    ($kind:ident => $($t:ty),*) => {
        $(
            impl Describe for $t {
                fn type_spec() -> TypeSpec {
                    TypeSpec::Primitive(Primitive::$kind)
                }
            }
        )*
    };
}

describe_primitive!(String => String, str, char);
describe_primitive!(Integer => i8, i16, i32, u8, u16);
describe_primitive!(Int64 => i64, u32, u64, isize, usize);
describe_primitive!(Number => f32, f64);
describe_primitive!(Boolean => bool);
describe_primitive!(Any => Value);
describe_primitive!(Object => serde_json::Map<String, Value>);

/// Raw bytes, described as `string` / `binary`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binary(pub Vec<u8>);

describe_primitive!(Binary => Binary);

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn type_spec() -> TypeSpec {
        T::type_spec()
    }
}

impl<T: Describe> Describe for Option<T> {
    fn type_spec() -> TypeSpec {
        TypeSpec::Optional(Box::new(T::type_spec()))
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn type_spec() -> TypeSpec {
        TypeSpec::List(Box::new(T::type_spec()))
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn type_spec() -> TypeSpec {
        TypeSpec::List(Box::new(T::type_spec()))
    }
}

impl<T: Describe> Describe for HashSet<T> {
    fn type_spec() -> TypeSpec {
        TypeSpec::Set(Box::new(T::type_spec()))
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn type_spec() -> TypeSpec {
        TypeSpec::Set(Box::new(T::type_spec()))
    }
}

macro_rules! describe_map {
    ($($map:ident),*) => {
        $(
            impl<K: Describe, V: Describe> Describe for $map<K, V> {
                fn type_spec() -> TypeSpec {
                    TypeSpec::Dict(Box::new(K::type_spec()), Box::new(V::type_spec()))
                }
            }
        )*
    };
}

describe_map!(HashMap, BTreeMap, IndexMap);

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    schema: Option<Schema>,
}

/// Resolves candidates to schemas and owns the schema component registry.
///
/// One factory lives per document build. Registry keys are qualified type paths
/// (`crate::models::Pet`); components and references use the bare name (`Pet`).
#[derive(Debug, Clone, Default)]
pub struct SchemaFactory {
    entries: IndexMap<String, Entry>,
    names: HashMap<String, String>,
}

impl SchemaFactory {
    /// Creates a factory with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `candidate`, attaching `description` when given.
    ///
    /// Resolution order: ready schemas, literal mappings, literal sequences,
    /// primitives, generic containers, enums, bound models, reflected structs.
    /// Anything else is a resolution error.
    pub fn get_schema(
        &mut self,
        candidate: impl Into<TypeSpec>,
        description: Option<&str>,
    ) -> AppResult<Schema> {
        let mut schema = self.resolve(candidate.into())?;
        if let Some(text) = description {
            schema.description = Some(text.to_string());
        }
        Ok(schema)
    }

    /// Resolves the Rust type `T`.
    pub fn schema_of<T: Describe + ?Sized>(&mut self) -> AppResult<Schema> {
        self.resolve(T::type_spec())
    }

    fn resolve(&mut self, candidate: TypeSpec) -> AppResult<Schema> {
        match candidate {
            TypeSpec::Schema(schema) => Ok(schema),
            TypeSpec::Mapping(entries) => {
                let mut schema = Schema::object();
                for (name, spec) in entries {
                    let property = self.resolve(spec)?;
                    schema.properties.insert(name, property);
                }
                Ok(schema)
            }
            TypeSpec::Sequence(element) | TypeSpec::List(element) | TypeSpec::Set(element) => {
                Ok(Schema::array(self.resolve(*element)?))
            }
            TypeSpec::Primitive(primitive) => Ok(primitive.schema()),
            TypeSpec::Dict(_, _) => Ok(Schema::object().with_additional_properties(true)),
            TypeSpec::Optional(inner) => self.resolve(*inner),
            TypeSpec::Enum(spec) => Ok(enum_schema((spec.values)())),
            TypeSpec::Bound(spec) => self.register_with(spec.module, spec.name, spec.build),
            TypeSpec::Class(spec) => {
                self.register_with(spec.module, spec.name, |factory: &mut Self| {
                    let mut schema = Schema::object();
                    for (field, ty) in (spec.fields)() {
                        let required = !ty.is_optional();
                        let property = factory.resolve(ty)?;
                        schema.properties.insert(field.to_string(), property);
                        if required {
                            schema.required.push(field.to_string());
                        }
                    }
                    Ok(schema)
                })
            }
            TypeSpec::Opaque(name) => Err(AppError::Resolution(format!(
                "No schema rule matches type '{}'",
                name
            ))),
        }
    }

    /// Reserves `module::name`, builds the schema, and returns a reference to it.
    fn register_with<F>(&mut self, module: &str, name: &str, build: F) -> AppResult<Schema>
    where
        F: FnOnce(&mut Self) -> AppResult<Schema>,
    {
        let qualified = format!("{}::{}", module, name);
        if self.entries.contains_key(&qualified) {
            debug!(component = %qualified, "Component already registered, emitting $ref");
            return Ok(Schema::reference(name));
        }
        let mark = self.entries.len();
        self.reserve(&qualified, name)?;

        match build(self) {
            Ok(schema) => {
                if let Some(entry) = self.entries.get_mut(&qualified) {
                    entry.schema = Some(schema);
                }
                debug!(component = %qualified, name = name, "Registered schema component");
                Ok(Schema::reference(name))
            }
            Err(err) => {
                // Components registered while building refer to this one; drop them too.
                for (dropped, entry) in self.entries.drain(mark..) {
                    debug!(component = %dropped, "Rolling back schema component");
                    self.names.remove(&entry.name);
                }
                Err(err)
            }
        }
    }

    fn reserve(&mut self, qualified: &str, name: &str) -> AppResult<()> {
        if let Some(owner) = self.names.get(name) {
            if owner != qualified {
                return Err(AppError::Resolution(format!(
                    "Schema name '{}' is claimed by both '{}' and '{}'",
                    name, owner, qualified
                )));
            }
        }
        self.names.insert(name.to_string(), qualified.to_string());
        self.entries.insert(
            qualified.to_string(),
            Entry {
                name: name.to_string(),
                schema: None,
            },
        );
        Ok(())
    }

    /// Registers a hand-built schema under `name`.
    ///
    /// The name is qualified as-is; re-registering the same name replaces the schema.
    pub fn register(&mut self, name: &str, schema: Schema) -> AppResult<Schema> {
        self.reserve(name, name)?;
        if let Some(entry) = self.entries.get_mut(name) {
            entry.schema = Some(schema);
        }
        debug!(name = name, "Registered schema component");
        Ok(Schema::reference(name))
    }

    /// Whether a component with the bare `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// The registered schema for the bare `name`.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        let qualified = self.names.get(name)?;
        self.entries.get(qualified)?.schema.as_ref()
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `$ref` base of registered components.
    pub fn ref_base(&self) -> &'static str {
        SCHEMA_REF_BASE
    }

    /// Completed components keyed by bare name, in registration order.
    pub fn components(&self) -> IndexMap<String, Schema> {
        self.entries
            .values()
            .filter_map(|entry| {
                entry
                    .schema
                    .as_ref()
                    .map(|schema| (entry.name.clone(), schema.clone()))
            })
            .collect()
    }

    /// Moves the components of `other` into this registry.
    ///
    /// Entries already present are kept; a bare name owned by a different type is an error.
    pub fn merge(&mut self, other: SchemaFactory) -> AppResult<()> {
        for (qualified, entry) in other.entries {
            if self.entries.contains_key(&qualified) {
                continue;
            }
            self.reserve(&qualified, &entry.name)?;
            if let Some(slot) = self.entries.get_mut(&qualified) {
                slot.schema = entry.schema;
            }
        }
        Ok(())
    }

    /// Empties the registry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.names.clear();
    }
}

/// Builds an inline enum schema typed by the first non-null member value.
fn enum_schema(values: Vec<Value>) -> Schema {
    let first_type = values.iter().find_map(SchemaType::of_value);
    let base = match first_type {
        Some(SchemaType::String) => Schema::string(),
        Some(SchemaType::Integer) => Schema::integer(),
        Some(SchemaType::Number) => Schema::number(),
        Some(SchemaType::Boolean) => Schema::boolean(),
        _ => Schema::new(),
    };
    base.with_enum(values)
}

/// Declares a struct and describes its fields for schema discovery.
///
/// The struct resolves to a registered component named after it.
///
/// ```
/// use oasdoc_core::{reflect_struct, SchemaFactory};
///
/// reflect_struct! {
///     /// A node in a linked list.
///     #[derive(Debug, Clone, Default)]
///     pub struct Node {
///         pub label: String,
///         pub next: Option<Box<Node>>,
///     }
/// }
///
/// let mut factory = SchemaFactory::new();
/// let schema = factory.schema_of::<Node>().unwrap();
/// assert_eq!(schema.ref_path.as_deref(), Some("#/components/schemas/Node"));
/// ```
#[macro_export]
macro_rules! reflect_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $fvis:vis $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty ),*
        }

        impl $crate::schema::Describe for $name {
            fn type_spec() -> $crate::schema::TypeSpec {
                fn fields() -> ::std::vec::Vec<(&'static str, $crate::schema::TypeSpec)> {
                    ::std::vec![
                        $( (stringify!($field), <$ty as $crate::schema::Describe>::type_spec()) ),*
                    ]
                }
                $crate::schema::TypeSpec::Class($crate::schema::ClassSpec {
                    name: stringify!($name),
                    module: module_path!(),
                    fields,
                })
            }
        }
    };
}

/// Declares a fieldless enum with explicit serialized values.
///
/// The enum resolves to an inline schema listing the values in declaration order.
#[macro_export]
macro_rules! reflect_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),*
        }

        impl $name {
            /// The serialized value of this member.
            pub fn value(&self) -> $crate::serde_json::Value {
                match self {
                    $( $name::$variant => $crate::serde_json::Value::from($value) ),*
                }
            }
        }

        impl $crate::schema::Describe for $name {
            fn type_spec() -> $crate::schema::TypeSpec {
                fn values() -> ::std::vec::Vec<$crate::serde_json::Value> {
                    ::std::vec![ $( $crate::serde_json::Value::from($value) ),* ]
                }
                $crate::schema::TypeSpec::Enum($crate::schema::EnumSpec {
                    name: stringify!($name),
                    module: module_path!(),
                    values,
                })
            }
        }
    };
}
