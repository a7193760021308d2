#![deny(missing_docs)]

//! # Document Configuration
//!
//! Document metadata supplied from outside the code: a YAML or JSON file, or
//! environment variables.
//!
//! | Variable               | Field              |
//! |------------------------|--------------------|
//! | `API_TITLE`            | `title`            |
//! | `API_VERSION`          | `version`          |
//! | `API_DESCRIPTION`      | `description`      |
//! | `API_TERMS_OF_SERVICE` | `terms_of_service` |
//! | `API_LICENSE_NAME`     | `license_name`     |
//! | `API_LICENSE_URL`      | `license_url`      |
//! | `API_CONTACT_NAME`     | `contact_name`     |
//! | `API_CONTACT_EMAIL`    | `contact_email`    |
//! | `API_CONTACT_URL`      | `contact_url`      |
//! | `OPENAPI_VERSION`      | `openapi_version`  |
//! | `API_SERVERS`          | `servers` (comma separated) |

use crate::document::{Contact, Info, License, OpenApi, Paths, Server};
use crate::error::{AppError, AppResult};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Metadata used to create a document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// API title.
    pub title: Option<String>,
    /// API version.
    pub version: Option<String>,
    /// API description.
    pub description: Option<String>,
    /// Terms of service URL.
    pub terms_of_service: Option<String>,
    /// OpenAPI version written to the document.
    pub openapi_version: Option<String>,
    /// License name.
    pub license_name: Option<String>,
    /// License URL.
    pub license_url: Option<String>,
    /// Contact name.
    pub contact_name: Option<String>,
    /// Contact email.
    pub contact_email: Option<String>,
    /// Contact URL.
    pub contact_url: Option<String>,
    /// Server URLs.
    pub servers: Vec<String>,
}

impl DocumentConfig {
    /// Parses YAML (or JSON) text.
    pub fn from_yaml_str(text: &str) -> AppResult<Self> {
        let config: DocumentConfig = serde_yaml::from_str(text)?;
        info!(title = ?config.title, "Loaded document configuration");
        Ok(config)
    }

    /// Reads a YAML or JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Builds the configuration from `(name, value)` pairs; unknown names are ignored.
    pub fn from_env_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            let value = value.into();
            let slot = match key.as_ref() {
                "API_TITLE" => &mut config.title,
                "API_VERSION" => &mut config.version,
                "API_DESCRIPTION" => &mut config.description,
                "API_TERMS_OF_SERVICE" => &mut config.terms_of_service,
                "API_LICENSE_NAME" => &mut config.license_name,
                "API_LICENSE_URL" => &mut config.license_url,
                "API_CONTACT_NAME" => &mut config.contact_name,
                "API_CONTACT_EMAIL" => &mut config.contact_email,
                "API_CONTACT_URL" => &mut config.contact_url,
                "OPENAPI_VERSION" => &mut config.openapi_version,
                "API_SERVERS" => {
                    config.servers = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                    continue;
                }
                _ => continue,
            };
            *slot = Some(value).filter(|v| !v.is_empty());
        }
        info!(title = ?config.title, "Loaded document configuration from environment");
        config
    }

    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_env_vars(std::env::vars())
    }

    /// Builds the `Info` object, validating URLs.
    ///
    /// Title and version are required. A license URL needs a license name.
    pub fn into_info(self) -> AppResult<Info> {
        let title = required(self.title, "title")?;
        let version = required(self.version, "version")?;
        let mut info = Info::new(title, version);
        info.description = self.description;
        info.terms_of_service = self.terms_of_service;

        if self.contact_name.is_some()
            || self.contact_email.is_some()
            || self.contact_url.is_some()
        {
            let mut contact = Contact::new();
            contact.name = self.contact_name;
            contact.email = self.contact_email;
            if let Some(url) = self.contact_url {
                contact = contact.with_url(url)?;
            }
            info.contact = Some(contact);
        }

        match (self.license_name, self.license_url) {
            (Some(name), url) => {
                let mut license = License::new(name);
                if let Some(url) = url {
                    license = license.with_url(url)?;
                }
                info.license = Some(license);
            }
            (None, Some(url)) => {
                return Err(AppError::Validation(format!(
                    "License URL '{}' given without a license name",
                    url
                )))
            }
            (None, None) => {}
        }
        Ok(info)
    }

    /// Builds a document root with no paths.
    pub fn into_document(self) -> AppResult<OpenApi> {
        let openapi_version = self.openapi_version.clone();
        let servers = self.servers.clone();
        let mut api = OpenApi::new(self.into_info()?, Paths::new());
        if let Some(version) = openapi_version {
            api.openapi = version;
        }
        for url in servers {
            api.add_server(Server::new(url));
        }
        Ok(api)
    }
}

fn required(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("Document {} is required", field)))
}
