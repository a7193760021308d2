#![deny(missing_docs)]

//! # Tags
//!
//! `Tag` and `ExternalDocumentation`.

use crate::error::AppResult;
use crate::model::{impl_extensible, Extensions, Projection, ToDict};
use crate::validation::validate_url;

/// A reference to external documentation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalDocumentation {
    url: String,
    /// Optional description.
    pub description: Option<String>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl ExternalDocumentation {
    /// Creates a reference to `url`; it must be absolute.
    pub fn new(url: impl Into<String>) -> AppResult<Self> {
        let url = url.into();
        validate_url(&url, "ExternalDocumentation.url")?;
        Ok(Self {
            url,
            description: None,
            extensions: Extensions::new(),
        })
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The documentation URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ToDict for ExternalDocumentation {
    fn project(&self, out: &mut Projection) {
        out.field("description", &self.description)
            .field("url", &self.url)
            .extensions(&self.extensions);
    }
}

/// Metadata for a tag used by operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    /// Tag name; tags are identified by name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional external documentation.
    pub external_docs: Option<ExternalDocumentation>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Tag {
    /// Creates a tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attaches external documentation.
    pub fn external_doc(
        mut self,
        url: impl Into<String>,
        description: Option<&str>,
    ) -> AppResult<Self> {
        let mut docs = ExternalDocumentation::new(url)?;
        docs.description = description.map(str::to_string);
        self.external_docs = Some(docs);
        Ok(self)
    }
}

impl ToDict for Tag {
    fn project(&self, out: &mut Projection) {
        out.field("name", &self.name)
            .field("description", &self.description)
            .model("external_docs", self.external_docs.as_ref())
            .extensions(&self.extensions);
    }
}

impl_extensible!(Tag, ExternalDocumentation);
