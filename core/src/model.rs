#![deny(missing_docs)]

//! # Model Base Layer
//!
//! Dictionary projection shared by every document object.
//!
//! A type implements [`ToDict`] by listing its attributes, in declaration order,
//! against a [`Projection`]. The projection applies the serialization rules:
//!
//! - falsy values (`None`, empty strings, empty lists and maps, `null`) are omitted,
//! - booleans are always kept once set, including `false`, and numbers are kept including `0`,
//! - the attribute `ref` is emitted as `$ref`,
//! - attribute names are converted from snake_case to camelCase unless the object opts out,
//! - map keys supplied by the caller (status codes, media types, property names) are kept verbatim,
//! - specification extensions are merged last, at the same level as the regular fields.

use crate::error::AppResult;
use crate::validation::validate_extension_name;
use heck::ToLowerCamelCase;
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

/// Key naming discipline applied to an object's own attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyCase {
    /// `terms_of_service` becomes `termsOfService`.
    #[default]
    Camel,
    /// Attribute names are emitted as declared.
    Snake,
}

impl KeyCase {
    /// Applies the case rule to one attribute name.
    pub fn apply(self, name: &str) -> String {
        if name == "ref" {
            return "$ref".to_string();
        }
        match self {
            KeyCase::Camel => camel_case(name),
            KeyCase::Snake => name.to_string(),
        }
    }
}

/// Converts a snake_case attribute name to camelCase.
///
/// `operation_id` becomes `operationId`; a single word such as `id` is unchanged.
pub fn camel_case(name: &str) -> String {
    if !name.contains('_') {
        return name.to_string();
    }
    name.to_lower_camel_case()
}

/// Capability of projecting a document object into an ordered JSON map.
pub trait ToDict {
    /// Lists the object's attributes against the projection.
    fn project(&self, out: &mut Projection);

    /// The key case the object serializes with by default.
    fn key_case(&self) -> KeyCase {
        KeyCase::Camel
    }

    /// Projects the object with its own key case.
    fn to_dict(&self) -> Map<String, Value> {
        self.to_dict_with(self.key_case())
    }

    /// Projects the object with an explicit key case.
    fn to_dict_with(&self, case: KeyCase) -> Map<String, Value> {
        let mut projection = Projection::new(case);
        self.project(&mut projection);
        projection.finish()
    }

    /// Projects the object and wraps the result as a JSON value.
    fn to_value(&self) -> Value {
        Value::Object(self.to_dict())
    }
}

/// Accumulates the projected attributes of one object.
#[derive(Debug)]
pub struct Projection {
    case: KeyCase,
    fields: Map<String, Value>,
    extensions: Map<String, Value>,
}

impl Projection {
    /// Creates an empty projection using the given key case.
    pub fn new(case: KeyCase) -> Self {
        Self {
            case,
            fields: Map::new(),
            extensions: Map::new(),
        }
    }

    /// Projects a plain attribute (string, number, boolean, enum, list, map, JSON value).
    pub fn field<V: Project + ?Sized>(&mut self, name: &str, value: &V) -> &mut Self {
        if let Some(v) = value.project() {
            self.fields.insert(self.case.apply(name), v);
        }
        self
    }

    /// Projects a nested document object; an object projecting to nothing is omitted.
    pub fn model<T: ToDict + ?Sized>(&mut self, name: &str, value: Option<&T>) -> &mut Self {
        if let Some(model) = value {
            let dict = model.to_dict();
            if !dict.is_empty() {
                self.fields.insert(self.case.apply(name), Value::Object(dict));
            }
        }
        self
    }

    /// Projects a list of nested document objects.
    pub fn models<T: ToDict>(&mut self, name: &str, values: &[T]) -> &mut Self {
        if !values.is_empty() {
            let items = values.iter().map(ToDict::to_value).collect();
            self.fields.insert(self.case.apply(name), Value::Array(items));
        }
        self
    }

    /// Projects a caller-keyed map of nested document objects; keys are kept verbatim.
    pub fn model_map<T: ToDict>(&mut self, name: &str, values: &IndexMap<String, T>) -> &mut Self {
        if !values.is_empty() {
            let map = values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect();
            self.fields.insert(self.case.apply(name), Value::Object(map));
        }
        self
    }

    /// Inserts an already projected value under a verbatim key.
    pub fn raw(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Records the specification extensions, merged after every other field.
    pub fn extensions(&mut self, extensions: &Extensions) -> &mut Self {
        for (k, v) in extensions.iter() {
            self.extensions.insert(k.clone(), v.clone());
        }
        self
    }

    /// Returns the projected map.
    pub fn finish(mut self) -> Map<String, Value> {
        self.fields.append(&mut self.extensions);
        self.fields
    }
}

/// Conversion of a single attribute value into its JSON representation.
pub trait Project {
    /// The full JSON representation, used for list elements and map values.
    fn to_json(&self) -> Value;

    /// The representation used for an attribute, `None` when the value is falsy.
    fn project(&self) -> Option<Value> {
        prune(self.to_json())
    }
}

fn prune(value: Value) -> Option<Value> {
    match &value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(a) if a.is_empty() => None,
        Value::Object(o) if o.is_empty() => None,
        _ => Some(value),
    }
}

impl Project for str {
    fn to_json(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl Project for String {
    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Project for bool {
    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Project for f64 {
    fn to_json(&self) -> Value {
        // Integral bounds render as integers (`minimum: 1`, not `1.0`).
        if self.fract() == 0.0 && self.abs() < i64::MAX as f64 {
            #[allow(clippy::cast_possible_truncation)]
            return Value::from(*self as i64);
        }
        Number::from_f64(*self).map_or(Value::Null, Value::Number)
    }
}

macro_rules! project_integer {
    ($($t:ty),*) => {
        $(
            impl Project for $t {
                fn to_json(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

project_integer!(i32, i64, u32, u64, usize);

impl Project for Value {
    fn to_json(&self) -> Value {
        self.clone()
    }
}

impl<T: Project> Project for Option<T> {
    fn to_json(&self) -> Value {
        self.as_ref().map_or(Value::Null, Project::to_json)
    }

    fn project(&self) -> Option<Value> {
        self.as_ref().and_then(Project::project)
    }
}

impl<T: Project> Project for Vec<T> {
    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(Project::to_json).collect())
    }
}

impl<T: Project> Project for IndexMap<String, T> {
    fn to_json(&self) -> Value {
        Value::Object(self.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
    }
}

/// Specification extensions (`x-...`) attached to a document object.
///
/// Values are kept verbatim, including `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extensions(IndexMap<String, Value>);

impl Extensions {
    /// Creates an empty extension bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an extension, rejecting names that do not start with `x-`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> AppResult<()> {
        let name = name.into();
        validate_extension_name(&name)?;
        self.0.insert(name, value.into());
        Ok(())
    }

    /// Returns the value recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Iterates the extensions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of recorded extensions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no extension is recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copies entries from `other` whose names are not recorded yet.
    pub fn merge(&mut self, other: &Extensions) {
        for (k, v) in other.iter() {
            if !self.0.contains_key(k) {
                self.0.insert(k.clone(), v.clone());
            }
        }
    }
}

/// Capability of carrying specification extensions.
pub trait Extensible {
    /// Mutable access to the extension bag.
    fn extensions_mut(&mut self) -> &mut Extensions;

    /// Adds an extension in place.
    ///
    /// Fails with a validation error when the name does not start with `x-`.
    fn add_extension(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> AppResult<&mut Self>
    where
        Self: Sized,
    {
        self.extensions_mut().add(name, value)?;
        Ok(self)
    }

    /// Builder form of [`Extensible::add_extension`].
    fn with_extension(mut self, name: impl Into<String>, value: impl Into<Value>) -> AppResult<Self>
    where
        Self: Sized,
    {
        self.extensions_mut().add(name, value)?;
        Ok(self)
    }
}

/// Implements [`Extensible`] for types holding an `extensions: Extensions` field.
macro_rules! impl_extensible {
    ($($t:ty),* $(,)?) => {
        $(
            impl $crate::model::Extensible for $t {
                fn extensions_mut(&mut self) -> &mut $crate::model::Extensions {
                    &mut self.extensions
                }
            }
        )*
    };
}

pub(crate) use impl_extensible;
