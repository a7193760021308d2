#![deny(missing_docs)]

//! # Parameters
//!
//! A parameter is identified by its name and location. Each location has its own
//! constructor, which fixes `in` and the default `style`; path parameters are always
//! required.

use crate::document::content::{Example, MediaType, RefOr};
use crate::error::{AppError, AppResult};
use crate::model::{impl_extensible, Extensions, Project, Projection, ToDict};
use crate::schema::{Schema, SchemaFactory, TypeSpec};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    /// Part of the URL path.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParameterLocation {
    /// The serialized value of `in`.
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }

    /// The style applied when none is set.
    pub fn default_style(self) -> Style {
        match self {
            ParameterLocation::Path | ParameterLocation::Header => Style::Simple,
            ParameterLocation::Query | ParameterLocation::Cookie => Style::Form,
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Project for ParameterLocation {
    fn to_json(&self) -> Value {
        Value::String(self.as_str().to_string())
    }
}

/// How a parameter value is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    /// `form`
    Form,
    /// `label`
    Label,
    /// `matrix`
    Matrix,
    /// `simple`
    Simple,
    /// `spaceDelimited`
    SpaceDelimited,
    /// `pipeDelimited`
    PipeDelimited,
    /// `deepObject`
    DeepObject,
}

impl Style {
    /// The serialized value.
    pub fn as_str(self) -> &'static str {
        match self {
            Style::Form => "form",
            Style::Label => "label",
            Style::Matrix => "matrix",
            Style::Simple => "simple",
            Style::SpaceDelimited => "spaceDelimited",
            Style::PipeDelimited => "pipeDelimited",
            Style::DeepObject => "deepObject",
        }
    }
}

impl Project for Style {
    fn to_json(&self) -> Value {
        Value::String(self.as_str().to_string())
    }
}

/// A single operation parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name; case sensitive.
    pub name: String,
    location: ParameterLocation,
    required: Option<bool>,
    /// Description.
    pub description: Option<String>,
    /// Marks the parameter as deprecated.
    pub deprecated: Option<bool>,
    /// Allows empty values (query only).
    pub allow_empty_value: Option<bool>,
    style: Option<Style>,
    /// Explode arrays and objects.
    pub explode: Option<bool>,
    /// Allow reserved characters unescaped.
    pub allow_reserved: Option<bool>,
    schema: Option<Schema>,
    content: IndexMap<String, MediaType>,
    /// Example value.
    pub example: Option<Value>,
    /// Named examples.
    pub examples: IndexMap<String, RefOr<Example>>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Parameter {
    fn located(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            location,
            required: None,
            description: None,
            deprecated: None,
            allow_empty_value: None,
            style: None,
            explode: None,
            allow_reserved: None,
            schema: None,
            content: IndexMap::new(),
            example: None,
            examples: IndexMap::new(),
            extensions: Extensions::new(),
        }
    }

    /// A path parameter; always required.
    pub fn path(name: impl Into<String>) -> Self {
        Self {
            required: Some(true),
            ..Self::located(name, ParameterLocation::Path)
        }
    }

    /// A query parameter.
    pub fn query(name: impl Into<String>) -> Self {
        Self::located(name, ParameterLocation::Query)
    }

    /// A header parameter.
    pub fn header(name: impl Into<String>) -> Self {
        Self::located(name, ParameterLocation::Header)
    }

    /// A cookie parameter.
    pub fn cookie(name: impl Into<String>) -> Self {
        Self::located(name, ParameterLocation::Cookie)
    }

    /// Where the parameter is carried.
    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    /// The effective style: the explicit one, else the location default.
    pub fn style(&self) -> Style {
        self.style.unwrap_or_else(|| self.location.default_style())
    }

    /// Whether the parameter is required, if stated.
    pub fn required(&self) -> Option<bool> {
        self.required
    }

    /// The resolved schema.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Payload descriptions, when used instead of a schema.
    pub fn content(&self) -> &IndexMap<String, MediaType> {
        &self.content
    }

    /// Whether `other` is the same logical parameter (same name and location).
    pub fn same_as(&self, other: &Parameter) -> bool {
        self.name == other.name && self.location == other.location
    }

    /// Sets `required`. Path parameters stay required.
    pub fn with_required(mut self, required: bool) -> Self {
        if self.location == ParameterLocation::Path && !required {
            warn!(parameter = %self.name, "Path parameters are always required");
            return self;
        }
        self.required = Some(required);
        self
    }

    /// Overrides the location's default style.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets `deprecated`.
    pub fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = Some(deprecated);
        self
    }

    /// Sets `explode`.
    pub fn with_explode(mut self, explode: bool) -> Self {
        self.explode = Some(explode);
        self
    }

    /// Sets the example value.
    pub fn with_example(mut self, example: impl Into<Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Resolves `candidate` through the factory and uses it as the schema.
    ///
    /// Fails when the parameter already describes its value through `content`.
    pub fn with_schema(
        mut self,
        factory: &mut SchemaFactory,
        candidate: impl Into<TypeSpec>,
    ) -> AppResult<Self> {
        if !self.content.is_empty() {
            return Err(AppError::Validation(format!(
                "Parameter '{}' cannot have both schema and content",
                self.name
            )));
        }
        self.schema = Some(factory.get_schema(candidate, None)?);
        Ok(self)
    }

    /// Uses an already resolved schema, unless the parameter describes its value
    /// through `content`.
    pub(crate) fn with_resolved_schema(mut self, schema: Schema) -> Self {
        if self.content.is_empty() {
            self.schema = Some(schema);
        }
        self
    }

    /// Describes the value through a media type instead of a schema.
    pub fn with_content(
        mut self,
        media_type: impl Into<String>,
        content: MediaType,
    ) -> AppResult<Self> {
        if self.schema.is_some() {
            return Err(AppError::Validation(format!(
                "Parameter '{}' cannot have both schema and content",
                self.name
            )));
        }
        self.content.insert(media_type.into(), content);
        Ok(self)
    }

    /// Adds a named example.
    pub fn add_example(&mut self, name: impl Into<String>, example: impl Into<RefOr<Example>>) {
        self.examples.insert(name.into(), example.into());
    }

    /// Fills the gaps of this parameter from `other`, keeping every value already set.
    pub fn merge(&mut self, other: &Parameter) {
        fill(&mut self.required, &other.required);
        fill(&mut self.description, &other.description);
        fill(&mut self.deprecated, &other.deprecated);
        fill(&mut self.allow_empty_value, &other.allow_empty_value);
        fill(&mut self.style, &other.style);
        fill(&mut self.explode, &other.explode);
        fill(&mut self.allow_reserved, &other.allow_reserved);
        fill(&mut self.example, &other.example);
        if self.schema.is_none() && self.content.is_empty() {
            self.schema = other.schema.clone();
            self.content = other.content.clone();
        }
        for (name, example) in &other.examples {
            if !self.examples.contains_key(name) {
                self.examples.insert(name.clone(), example.clone());
            }
        }
        self.extensions.merge(&other.extensions);
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, other: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(other);
    }
}

impl ToDict for Parameter {
    fn project(&self, out: &mut Projection) {
        out.field("name", &self.name)
            .field("in", &self.location)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("deprecated", &self.deprecated)
            .field("allow_empty_value", &self.allow_empty_value)
            .field("style", &self.style())
            .field("explode", &self.explode)
            .field("allow_reserved", &self.allow_reserved)
            .model("schema", self.schema.as_ref())
            .field("example", &self.example)
            .model_map("examples", &self.examples)
            .model_map("content", &self.content)
            .extensions(&self.extensions);
    }
}

impl_extensible!(Parameter);

/// Adds `parameter` to `list`, merging into an existing parameter with the same identity.
pub(crate) fn reconcile(list: &mut Vec<Parameter>, parameter: &Parameter) {
    match list.iter_mut().find(|p| p.same_as(parameter)) {
        Some(existing) => existing.merge(parameter),
        None => list.push(parameter.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::content::APPLICATION_JSON;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_location_defaults() {
        assert_eq!(Parameter::path("id").style(), Style::Simple);
        assert_eq!(Parameter::header("X-Id").style(), Style::Simple);
        assert_eq!(Parameter::query("q").style(), Style::Form);
        assert_eq!(Parameter::cookie("session").style(), Style::Form);
        assert_eq!(Parameter::path("id").required(), Some(true));
        assert_eq!(Parameter::query("q").required(), None);
    }

    #[test]
    fn test_path_parameter_projection() {
        let mut factory = SchemaFactory::new();
        let param = Parameter::path("pet_id")
            .with_description("The pet")
            .with_schema(&mut factory, TypeSpec::of::<i64>())
            .unwrap();
        assert_eq!(
            param.to_value(),
            json!({
                "name": "pet_id",
                "in": "path",
                "description": "The pet",
                "required": true,
                "style": "simple",
                "schema": {"type": "integer", "format": "int64"}
            })
        );
    }

    #[test]
    fn test_required_false_is_serialized() {
        let param = Parameter::query("limit").with_required(false);
        let dict = param.to_dict();
        assert_eq!(dict.get("required"), Some(&json!(false)));
        assert_eq!(dict.get("allowEmptyValue"), None);
    }

    #[test]
    fn test_path_parameter_stays_required() {
        let param = Parameter::path("id").with_required(false);
        assert_eq!(param.required(), Some(true));
    }

    #[test]
    fn test_schema_and_content_are_exclusive() {
        let mut factory = SchemaFactory::new();
        let with_schema = Parameter::query("filter")
            .with_schema(&mut factory, Schema::string())
            .unwrap();
        let err = with_schema
            .with_content(APPLICATION_JSON, MediaType::new(Schema::object()))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let with_content = Parameter::query("filter")
            .with_content(APPLICATION_JSON, MediaType::new(Schema::object()))
            .unwrap();
        assert!(with_content.with_schema(&mut factory, Schema::string()).is_err());
    }

    #[test]
    fn test_merge_keeps_existing_and_fills_gaps() {
        let mut factory = SchemaFactory::new();
        let mut first = Parameter::query("limit").with_required(true);
        let second = Parameter::query("limit")
            .with_required(false)
            .with_description("Page size")
            .with_schema(&mut factory, TypeSpec::of::<i32>())
            .unwrap();
        first.merge(&second);
        assert_eq!(first.required(), Some(true));
        assert_eq!(first.description.as_deref(), Some("Page size"));
        assert_eq!(first.schema(), Some(&Schema::integer()));
    }

    #[test]
    fn test_identity_is_name_and_location() {
        assert!(Parameter::query("id").same_as(&Parameter::query("id")));
        assert!(!Parameter::query("id").same_as(&Parameter::header("id")));

        let mut list = vec![Parameter::query("id")];
        reconcile(&mut list, &Parameter::query("id").with_description("merged"));
        reconcile(&mut list, &Parameter::header("id"));
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].description.as_deref(), Some("merged"));
    }
}
