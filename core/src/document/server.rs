#![deny(missing_docs)]

//! # Servers
//!
//! `Server` and `ServerVariable`.

use crate::model::{impl_extensible, Extensions, Projection, ToDict};
use indexmap::IndexMap;
use serde_json::Value;

/// A substitution variable of a server URL template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerVariable {
    /// Value used when no alternative is supplied.
    pub default: String,
    /// Allowed values.
    pub enum_values: Vec<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl ServerVariable {
    /// Creates a variable with its default value.
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            ..Default::default()
        }
    }

    /// Restricts the variable to a set of values.
    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl ToDict for ServerVariable {
    fn project(&self, out: &mut Projection) {
        // `default` is required by the format, so an empty one is still written.
        out.field("enum", &self.enum_values)
            .raw("default", Value::String(self.default.clone()))
            .field("description", &self.description)
            .extensions(&self.extensions);
    }
}

/// A server hosting the API.
///
/// Servers compare by value; collections of servers treat equal servers as one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Server {
    /// Target URL, possibly relative, possibly templated with `{variables}`.
    pub url: String,
    /// Optional description.
    pub description: Option<String>,
    /// Variables substituted into `url`.
    pub variables: IndexMap<String, ServerVariable>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Server {
    /// Creates a server for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a URL template variable.
    pub fn add_variable(&mut self, name: impl Into<String>, variable: ServerVariable) -> &mut Self {
        self.variables.insert(name.into(), variable);
        self
    }

    /// Builder form of [`Server::add_variable`].
    pub fn with_variable(mut self, name: impl Into<String>, variable: ServerVariable) -> Self {
        self.add_variable(name, variable);
        self
    }
}

impl ToDict for Server {
    fn project(&self, out: &mut Projection) {
        out.field("url", &self.url)
            .field("description", &self.description)
            .model_map("variables", &self.variables)
            .extensions(&self.extensions);
    }
}

impl_extensible!(Server, ServerVariable);

/// Appends `server` unless an equal server is already listed.
pub(crate) fn push_unique(servers: &mut Vec<Server>, server: Server) {
    if !servers.contains(&server) {
        servers.push(server);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_server_with_variables() {
        let server = Server::new("https://{region}.example.com/v1")
            .with_description("Production")
            .with_variable(
                "region",
                ServerVariable::new("eu").with_enum(["eu", "us"]),
            );
        assert_eq!(
            server.to_value(),
            json!({
                "url": "https://{region}.example.com/v1",
                "description": "Production",
                "variables": {"region": {"enum": ["eu", "us"], "default": "eu"}}
            })
        );
    }

    #[test]
    fn test_empty_variable_default_is_written() {
        assert_eq!(ServerVariable::new("").to_value(), json!({"default": ""}));
    }

    #[test]
    fn test_push_unique_is_set_like() {
        let mut servers = Vec::new();
        push_unique(&mut servers, Server::new("/api"));
        push_unique(&mut servers, Server::new("/api"));
        push_unique(&mut servers, Server::new("/v2"));
        assert_eq!(servers.len(), 2);
    }
}
