#![deny(missing_docs)]

//! # Info
//!
//! API metadata: `Info`, `Contact` and `License`.
//! URLs are validated when they are set, not when the document is serialized.

use crate::error::AppResult;
use crate::model::{impl_extensible, Extensions, Projection, ToDict};
use crate::validation::validate_url;

/// Contact information for the exposed API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    /// Name of the contact person or organization.
    pub name: Option<String>,
    /// Email address of the contact.
    pub email: Option<String>,
    url: Option<String>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Contact {
    /// Creates empty contact information.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the contact name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the contact email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the contact URL; it must be absolute.
    pub fn with_url(mut self, url: impl Into<String>) -> AppResult<Self> {
        let url = url.into();
        validate_url(&url, "Contact.url")?;
        self.url = Some(url);
        Ok(self)
    }

    /// The validated contact URL.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl ToDict for Contact {
    fn project(&self, out: &mut Projection) {
        out.field("name", &self.name)
            .field("email", &self.email)
            .field("url", &self.url)
            .extensions(&self.extensions);
    }
}

/// License information for the exposed API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct License {
    /// License name.
    pub name: String,
    url: Option<String>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl License {
    /// Creates a license with a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the license URL; it must be absolute.
    pub fn with_url(mut self, url: impl Into<String>) -> AppResult<Self> {
        let url = url.into();
        validate_url(&url, "License.url")?;
        self.url = Some(url);
        Ok(self)
    }

    /// The validated license URL.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl ToDict for License {
    fn project(&self, out: &mut Projection) {
        out.field("name", &self.name)
            .field("url", &self.url)
            .extensions(&self.extensions);
    }
}

/// Metadata about the API.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    /// The title of the API.
    pub title: String,
    /// The version of the API document (not the OpenAPI version).
    pub version: String,
    /// Optional description for the API.
    pub description: Option<String>,
    /// Optional Terms of Service URL.
    pub terms_of_service: Option<String>,
    /// Optional contact information.
    pub contact: Option<Contact>,
    /// Optional license information.
    pub license: Option<License>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Info {
    /// Creates a new Info with required fields.
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Sets an optional description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the Terms of Service URL.
    pub fn with_terms_of_service(mut self, terms: impl Into<String>) -> Self {
        self.terms_of_service = Some(terms.into());
        self
    }

    /// Sets optional contact metadata.
    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }

    /// Sets optional license metadata.
    pub fn with_license(mut self, license: License) -> Self {
        self.license = Some(license);
        self
    }
}

impl ToDict for Info {
    fn project(&self, out: &mut Projection) {
        out.field("title", &self.title)
            .field("version", &self.version)
            .field("description", &self.description)
            .field("terms_of_service", &self.terms_of_service)
            .model("contact", self.contact.as_ref())
            .model("license", self.license.as_ref())
            .extensions(&self.extensions);
    }
}

impl_extensible!(Contact, License, Info);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::model::Extensible;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_info_projection() {
        let info = Info::new("Test", "1.2.2")
            .with_terms_of_service("https://example.com/tos")
            .with_contact(Contact::new().with_email("a@b.com"))
            .with_license(
                License::new("MIT")
                    .with_url("https://opensource.org/licenses/MIT")
                    .unwrap(),
            );
        assert_eq!(
            info.to_value(),
            json!({
                "title": "Test",
                "version": "1.2.2",
                "termsOfService": "https://example.com/tos",
                "contact": {"email": "a@b.com"},
                "license": {"name": "MIT", "url": "https://opensource.org/licenses/MIT"}
            })
        );
    }

    #[test]
    fn test_malformed_urls_are_rejected_at_construction() {
        let err = Contact::new().with_url("example.com").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(License::new("MIT").with_url("/relative").is_err());
    }

    #[test]
    fn test_contact_extension() {
        let mut contact = Contact::new().with_name("Ops");
        contact.add_extension("x-team", "platform").unwrap();
        assert_eq!(
            contact.to_value(),
            json!({"name": "Ops", "x-team": "platform"})
        );
    }
}
