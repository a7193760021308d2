#![deny(missing_docs)]

//! # Document Root
//!
//! `OpenApi` aggregates metadata, paths and components, and owns the
//! [`SchemaFactory`] used while building it. Components registered in the
//! factory are emitted under `components.schemas` next to the ones added by hand.
//!
//! `SharedOpenApi` wraps a document in a lock so routes can be registered while
//! the document is being served.

use crate::document::components::Components;
use crate::document::info::Info;
use crate::document::operation::SecurityRequirement;
use crate::document::paths::{PathItem, Paths};
use crate::document::server::{push_unique, Server};
use crate::document::tag::{ExternalDocumentation, Tag};
use crate::error::{AppError, AppResult};
use crate::model::{impl_extensible, Extensions, Projection, ToDict};
use crate::schema::SchemaFactory;
use crate::validation::check_document;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Version written to `openapi` unless configured otherwise.
pub const DEFAULT_OPENAPI_VERSION: &str = "3.0.2";

/// The root of an OpenAPI document.
#[derive(Debug, Clone)]
pub struct OpenApi {
    /// OpenAPI version of the document.
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Servers, each listed once.
    pub servers: Vec<Server>,
    /// Path items by URL template.
    pub paths: Paths,
    /// Reusable objects added by hand.
    pub components: Components,
    /// Alternative security requirements for every operation.
    pub security: Vec<SecurityRequirement>,
    /// Tags, unique by name.
    pub tags: Vec<Tag>,
    /// External documentation.
    pub external_docs: Option<ExternalDocumentation>,
    factory: SchemaFactory,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl OpenApi {
    /// Creates a document for `info` with the given paths.
    pub fn new(info: Info, paths: Paths) -> Self {
        Self {
            openapi: DEFAULT_OPENAPI_VERSION.to_string(),
            info,
            servers: Vec::new(),
            paths,
            components: Components::new(),
            security: Vec::new(),
            tags: Vec::new(),
            external_docs: None,
            factory: SchemaFactory::new(),
            extensions: Extensions::new(),
        }
    }

    /// Overrides the OpenAPI version string.
    pub fn with_openapi_version(mut self, version: impl Into<String>) -> Self {
        self.openapi = version.into();
        self
    }

    /// Sets external documentation.
    pub fn with_external_docs(mut self, docs: ExternalDocumentation) -> Self {
        self.external_docs = Some(docs);
        self
    }

    /// The schema factory backing this document.
    pub fn factory(&self) -> &SchemaFactory {
        &self.factory
    }

    /// Mutable access to the schema factory, for resolving types while building operations.
    pub fn factory_mut(&mut self) -> &mut SchemaFactory {
        &mut self.factory
    }

    /// Adds a tag; a tag with the same name already listed is kept.
    pub fn add_tag(&mut self, tag: Tag) -> &mut Self {
        if self.tags.iter().any(|t| t.name == tag.name) {
            debug!(tag = %tag.name, "Tag already declared");
        } else {
            self.tags.push(tag);
        }
        self
    }

    /// Builder form of [`OpenApi::add_tag`].
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.add_tag(tag);
        self
    }

    /// Adds a server unless an equal one is listed.
    pub fn add_server(&mut self, server: Server) -> &mut Self {
        push_unique(&mut self.servers, server);
        self
    }

    /// Builder form of [`OpenApi::add_server`].
    pub fn with_server(mut self, server: Server) -> Self {
        self.add_server(server);
        self
    }

    /// Adds one path item, merging with an item already registered for `url`.
    pub fn add_path(&mut self, url: impl Into<String>, item: PathItem) -> &mut Self {
        self.paths.add(url, item);
        self
    }

    /// Merges a sub-router's paths, each URL prefixed with `url_prefix`.
    pub fn add_paths(&mut self, paths: Paths, url_prefix: Option<&str>) -> &mut Self {
        let prefix = url_prefix.unwrap_or_default();
        for (url, item) in paths {
            self.paths.add(join_url(prefix, &url), item);
        }
        self
    }

    /// Adds an alternative security requirement for every operation.
    pub fn add_security<I, S>(&mut self, scheme: impl Into<String>, scopes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut requirement = SecurityRequirement::new();
        requirement.insert(scheme.into(), scopes.into_iter().map(Into::into).collect());
        self.security.push(requirement);
        self
    }

    /// Components as emitted: hand-added entries plus the factory's registry.
    pub fn resolved_components(&self) -> Components {
        let mut components = self.components.clone();
        components.fill_schemas(self.factory.components());
        components
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }

    /// YAML document; the same tree as [`OpenApi::to_json`].
    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(&self.to_value())?)
    }

    /// Parses the projected document into the `utoipa` model, failing when it does not conform.
    pub fn check(&self) -> AppResult<utoipa::openapi::OpenApi> {
        check_document(&self.to_value())
    }
}

/// Joins a mount prefix and a URL template without doubling the separator.
fn join_url(prefix: &str, url: &str) -> String {
    if prefix.is_empty() {
        return url.to_string();
    }
    match (prefix.ends_with('/'), url.starts_with('/')) {
        (true, true) => format!("{}{}", prefix, &url[1..]),
        (false, false) if !url.is_empty() => format!("{}/{}", prefix, url),
        _ => format!("{}{}", prefix, url),
    }
}

impl ToDict for OpenApi {
    fn project(&self, out: &mut Projection) {
        out.field("openapi", &self.openapi)
            .model("info", Some(&self.info))
            .models("servers", &self.servers);
        // `paths` is required even when no route is registered.
        out.raw("paths", self.paths.to_value())
            .model("components", Some(&self.resolved_components()))
            .field("security", &self.security)
            .models("tags", &self.tags)
            .model("external_docs", self.external_docs.as_ref())
            .extensions(&self.extensions);
    }
}

impl_extensible!(OpenApi);

/// A document shared between route registration and the handlers serving it.
#[derive(Debug, Clone)]
pub struct SharedOpenApi(Arc<RwLock<OpenApi>>);

impl SharedOpenApi {
    /// Wraps `api`.
    pub fn new(api: OpenApi) -> Self {
        Self(Arc::new(RwLock::new(api)))
    }

    /// Runs `f` with exclusive access to the document.
    pub fn register<F, R>(&self, f: F) -> AppResult<R>
    where
        F: FnOnce(&mut OpenApi) -> AppResult<R>,
    {
        let mut api = self
            .0
            .write()
            .map_err(|_| AppError::General("OpenAPI document lock is poisoned".to_string()))?;
        f(&mut api)
    }

    /// Runs `f` with shared access to the document.
    pub fn read<F, R>(&self, f: F) -> AppResult<R>
    where
        F: FnOnce(&OpenApi) -> R,
    {
        let api = self
            .0
            .read()
            .map_err(|_| AppError::General("OpenAPI document lock is poisoned".to_string()))?;
        Ok(f(&api))
    }

    /// The projected document tree.
    pub fn snapshot(&self) -> AppResult<Value> {
        self.read(|api| api.to_value())
    }

    /// Serves the document as pretty JSON.
    pub fn render_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot()?)?)
    }

    /// Serves the document as YAML.
    pub fn render_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(&self.snapshot()?)?)
    }
}

impl From<OpenApi> for SharedOpenApi {
    fn from(api: OpenApi) -> Self {
        Self::new(api)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::content::{ResponseObject, ResponsesObject};
    use crate::document::info::Contact;
    use crate::document::operation::Operation;
    use crate::schema::Schema;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn info() -> Info {
        Info::new("Test", "1.2.2").with_contact(Contact::new().with_email("a@b.com"))
    }

    fn item(description: &str) -> PathItem {
        PathItem::new().with_operation(Operation::get(
            ResponsesObject::new().with_response("200", ResponseObject::new(description)),
        ))
    }

    #[test]
    fn test_minimal_document() {
        let api = OpenApi::new(info(), Paths::new());
        let dict = api.to_dict();
        assert_eq!(dict["openapi"], json!("3.0.2"));
        assert_eq!(dict["info"]["contact"]["email"], json!("a@b.com"));
        assert_eq!(dict["paths"], json!({}));
        assert!(!dict.contains_key("components"));
    }

    #[test]
    fn test_configured_version() {
        let api = OpenApi::new(info(), Paths::new()).with_openapi_version("3.0.3");
        assert_eq!(api.to_dict()["openapi"], json!("3.0.3"));
    }

    #[test]
    fn test_tags_dedupe_first_wins() {
        let mut api = OpenApi::new(info(), Paths::new());
        api.add_tag(Tag::new("pets").with_description("first"));
        api.add_tag(Tag::new("pets").with_description("second"));
        api.add_tag(Tag::new("owners"));
        assert_eq!(api.tags.len(), 2);
        assert_eq!(api.tags[0].description.as_deref(), Some("first"));
    }

    #[test]
    fn test_servers_are_set_like() {
        let api = OpenApi::new(info(), Paths::new())
            .with_server(Server::new("https://api.example.com"))
            .with_server(Server::new("https://api.example.com"));
        assert_eq!(api.servers.len(), 1);
    }

    #[test]
    fn test_add_paths_with_prefix() {
        let mut api = OpenApi::new(info(), Paths::new());
        let mut sub = Paths::new();
        sub.add("/pets", item("pets"));
        sub.add("owners", item("owners"));
        api.add_paths(sub, Some("/api/"));
        api.add_paths(Paths::new().with_path("/health", item("ok")), None);
        let urls: Vec<&str> = api.paths.iter().map(|(url, _)| url.as_str()).collect();
        assert_eq!(urls, vec!["/api/pets", "/api/owners", "/health"]);
    }

    #[test]
    fn test_factory_components_are_emitted() {
        let mut api = OpenApi::new(info(), Paths::new());
        api.factory_mut()
            .register("Pet", Schema::object().with_property("name", Schema::string()))
            .unwrap();
        api.components.add_schema("Error", Schema::string());
        assert_eq!(
            api.to_dict()["components"],
            json!({
                "schemas": {
                    "Error": {"type": "string"},
                    "Pet": {"type": "object", "properties": {"name": {"type": "string"}}}
                }
            })
        );
    }

    #[test]
    fn test_security_and_json_output() {
        let mut api = OpenApi::new(info(), Paths::new());
        api.add_security("bearer", Vec::<String>::new());
        let parsed: Value = serde_json::from_str(&api.to_json().unwrap()).unwrap();
        assert_eq!(parsed["security"], json!([{"bearer": []}]));
    }

    #[test]
    fn test_shared_document_registration() {
        let shared = SharedOpenApi::new(OpenApi::new(info(), Paths::new()));
        shared
            .register(|api| {
                api.add_path("/x", item("x"));
                Ok(())
            })
            .unwrap();
        let clone = shared.clone();
        let rendered: Value = serde_json::from_str(&clone.render_json().unwrap()).unwrap();
        assert_eq!(
            rendered["paths"]["/x"]["get"]["responses"]["200"]["description"],
            json!("x")
        );
        let yaml: Value = serde_yaml::from_str(&shared.render_yaml().unwrap()).unwrap();
        assert_eq!(yaml, rendered);
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("", "/a"), "/a");
        assert_eq!(join_url("/v1/", "/a"), "/v1/a");
        assert_eq!(join_url("/v1", "a"), "/v1/a");
        assert_eq!(join_url("/v1", "/a"), "/v1/a");
    }
}
