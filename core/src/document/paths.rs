#![deny(missing_docs)]

//! # Paths
//!
//! `PathItem` holds at most one operation per HTTP method; `Paths` maps URL
//! templates to path items.
//!
//! Registration is incremental, so adding a path item for a URL that already
//! exists merges instead of replacing:
//!
//! - each method slot keeps its existing operation and adopts the incoming one only when empty,
//! - servers are appended unless an equal server is present,
//! - parameters with the same name and location are merged field by field, others appended,
//! - `summary`, `description` and `$ref` are filled only when empty.
//!
//! Setting an operation directly with [`PathItem::add_operation`] overwrites the slot.

use crate::document::operation::{HttpMethod, Operation};
use crate::document::parameter::{reconcile, Parameter};
use crate::document::server::{push_unique, Server};
use crate::model::{impl_extensible, Extensions, Projection, ToDict};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Operations available on a single path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
    /// External definition of this path item.
    pub ref_path: Option<String>,
    /// Summary applying to every operation.
    pub summary: Option<String>,
    /// Description applying to every operation.
    pub description: Option<String>,
    get: Option<Operation>,
    put: Option<Operation>,
    post: Option<Operation>,
    delete: Option<Operation>,
    options: Option<Operation>,
    head: Option<Operation>,
    patch: Option<Operation>,
    trace: Option<Operation>,
    /// Servers for every operation on this path.
    pub servers: Vec<Server>,
    /// Parameters shared by every operation on this path.
    pub parameters: Vec<Parameter>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl PathItem {
    /// Creates an empty path item.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Trace => &mut self.trace,
        }
    }

    /// The operation bound to `method`.
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }

    /// Mutable access to the operation bound to `method`.
    pub fn operation_mut(&mut self, method: HttpMethod) -> Option<&mut Operation> {
        self.slot_mut(method).as_mut()
    }

    /// Methods with an operation, in slot order.
    pub fn methods(&self) -> Vec<HttpMethod> {
        HttpMethod::ALL
            .into_iter()
            .filter(|m| self.operation(*m).is_some())
            .collect()
    }

    /// Binds `operation` to its method's slot; a previous operation is replaced.
    pub fn add_operation(&mut self, operation: Operation) -> &mut Self {
        let method = operation.http_method();
        let slot = self.slot_mut(method);
        if slot.is_some() {
            debug!(method = %method, "Replacing operation on path item");
        }
        *slot = Some(operation);
        self
    }

    /// Builder form of [`PathItem::add_operation`].
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.add_operation(operation);
        self
    }

    /// Adds a server unless an equal one is listed.
    pub fn add_server(&mut self, server: Server) -> &mut Self {
        push_unique(&mut self.servers, server);
        self
    }

    /// Adds a shared parameter, merging into an existing one with the same identity.
    pub fn add_parameter(&mut self, parameter: Parameter) -> &mut Self {
        reconcile(&mut self.parameters, &parameter);
        self
    }

    /// Builder form of [`PathItem::add_parameter`].
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.add_parameter(parameter);
        self
    }

    /// Sets the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Merges `other` into this item; what is already here wins.
    pub fn merge_path_item(&mut self, other: PathItem) {
        let PathItem {
            ref_path,
            summary,
            description,
            get,
            put,
            post,
            delete,
            options,
            head,
            patch,
            trace,
            servers,
            parameters,
            extensions,
        } = other;

        let incoming = [get, put, post, delete, options, head, patch, trace];
        for (method, operation) in HttpMethod::ALL.into_iter().zip(incoming) {
            let slot = self.slot_mut(method);
            if slot.is_none() {
                *slot = operation;
            }
        }
        for server in servers {
            push_unique(&mut self.servers, server);
        }
        for parameter in &parameters {
            reconcile(&mut self.parameters, parameter);
        }
        if self.ref_path.is_none() {
            self.ref_path = ref_path;
        }
        if self.summary.is_none() {
            self.summary = summary;
        }
        if self.description.is_none() {
            self.description = description;
        }
        self.extensions.merge(&extensions);
    }
}

impl ToDict for PathItem {
    fn project(&self, out: &mut Projection) {
        out.field("ref", &self.ref_path)
            .field("summary", &self.summary)
            .field("description", &self.description);
        for method in HttpMethod::ALL {
            out.model(method.slot(), self.operation(method));
        }
        out.models("servers", &self.servers)
            .models("parameters", &self.parameters)
            .extensions(&self.extensions);
    }
}

/// URL templates mapped to their path items, in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paths {
    items: IndexMap<String, PathItem>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Paths {
    /// Creates an empty set of paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `item` under `url`, merging with an item already registered there.
    pub fn add(&mut self, url: impl Into<String>, item: PathItem) -> &mut Self {
        let url = url.into();
        match self.items.get_mut(&url) {
            Some(existing) => {
                debug!(path = %url, "Merging path item");
                existing.merge_path_item(item);
            }
            None => {
                self.items.insert(url, item);
            }
        }
        self
    }

    /// Builder form of [`Paths::add`].
    pub fn with_path(mut self, url: impl Into<String>, item: PathItem) -> Self {
        self.add(url, item);
        self
    }

    /// The item registered under `url`.
    pub fn get(&self, url: &str) -> Option<&PathItem> {
        self.items.get(url)
    }

    /// Iterates URL templates and items in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PathItem)> {
        self.items.iter()
    }

    /// Number of URL templates.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no path is registered.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for Paths {
    type Item = (String, PathItem);
    type IntoIter = indexmap::map::IntoIter<String, PathItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl ToDict for Paths {
    fn project(&self, out: &mut Projection) {
        for (url, item) in &self.items {
            out.raw(url.clone(), Value::Object(item.to_dict()));
        }
        out.extensions(&self.extensions);
    }
}

impl_extensible!(PathItem, Paths);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::content::{ResponseObject, ResponsesObject};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn responses(description: &str) -> ResponsesObject {
        ResponsesObject::new().with_response("200", ResponseObject::new(description))
    }

    #[test]
    fn test_add_operation_later_wins() {
        let mut item = PathItem::new();
        item.add_operation(Operation::get(responses("first")));
        item.add_operation(Operation::get(responses("second")));
        let op = item.operation(HttpMethod::Get).unwrap();
        assert_eq!(
            op.to_dict()["responses"],
            json!({"200": {"description": "second"}})
        );
    }

    #[test]
    fn test_merge_keeps_existing_slots() {
        let mut first = PathItem::new().with_operation(Operation::get(responses("first")));
        let second = PathItem::new()
            .with_operation(Operation::get(responses("second")))
            .with_operation(Operation::delete(responses("gone")))
            .with_summary("Pets");
        first.merge_path_item(second);
        assert_eq!(first.methods(), vec![HttpMethod::Get, HttpMethod::Delete]);
        assert_eq!(
            first.operation(HttpMethod::Get).unwrap().responses,
            responses("first")
        );
        assert_eq!(first.summary.as_deref(), Some("Pets"));
    }

    #[test]
    fn test_merge_reconciles_servers_and_parameters() {
        let mut first = PathItem::new().with_parameter(Parameter::path("id"));
        first.add_server(Server::new("/v1"));
        let mut second = PathItem::new()
            .with_parameter(Parameter::path("id").with_description("Identifier"))
            .with_parameter(Parameter::query("expand"));
        second.add_server(Server::new("/v1"));
        second.add_server(Server::new("/v2"));

        first.merge_path_item(second);
        assert_eq!(first.servers.len(), 2);
        assert_eq!(first.parameters.len(), 2);
        assert_eq!(first.parameters[0].description.as_deref(), Some("Identifier"));
    }

    #[test]
    fn test_paths_add_is_order_independent() {
        let mut a = Paths::new();
        a.add("/x", PathItem::new().with_operation(Operation::get(responses("g"))));
        a.add("/x", PathItem::new().with_operation(Operation::post(responses("p"))));

        let mut b = Paths::new();
        b.add("/x", PathItem::new().with_operation(Operation::post(responses("p"))));
        b.add("/x", PathItem::new().with_operation(Operation::get(responses("g"))));

        assert_eq!(a.len(), 1);
        assert_eq!(a.get("/x"), b.get("/x"));
        assert_eq!(a.to_value(), b.to_value());
    }

    #[test]
    fn test_paths_projection_keeps_urls_verbatim() {
        let paths = Paths::new().with_path(
            "/pets/{pet_id}",
            PathItem::new()
                .with_parameter(Parameter::path("pet_id"))
                .with_operation(Operation::get(responses("A pet"))),
        );
        assert_eq!(
            paths.to_value(),
            json!({
                "/pets/{pet_id}": {
                    "get": {"responses": {"200": {"description": "A pet"}}},
                    "parameters": [
                        {"name": "pet_id", "in": "path", "required": true, "style": "simple"}
                    ]
                }
            })
        );
    }
}
