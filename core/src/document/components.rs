#![deny(missing_docs)]

//! # Components
//!
//! Reusable objects referenced with `#/components/<kind>/<Name>`, and the
//! security scheme objects that live there.

use crate::document::content::{Example, Header, Link, RefOr, RequestBody, ResponseObject};
use crate::document::operation::Callback;
use crate::document::parameter::{Parameter, ParameterLocation};
use crate::error::{AppError, AppResult};
use crate::model::{impl_extensible, Extensions, Project, Projection, ToDict};
use crate::schema::Schema;
use crate::validation::validate_url;
use indexmap::IndexMap;
use serde_json::Value;

/// Kind of a security scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecuritySchemeType {
    /// API key in a header, query string or cookie.
    ApiKey,
    /// HTTP authentication (`basic`, `bearer`, ...).
    Http,
    /// OAuth 2 flows.
    OAuth2,
    /// OpenID Connect discovery.
    OpenIdConnect,
}

impl SecuritySchemeType {
    /// The serialized value.
    pub fn as_str(self) -> &'static str {
        match self {
            SecuritySchemeType::ApiKey => "apiKey",
            SecuritySchemeType::Http => "http",
            SecuritySchemeType::OAuth2 => "oauth2",
            SecuritySchemeType::OpenIdConnect => "openIdConnect",
        }
    }
}

impl Project for SecuritySchemeType {
    fn to_json(&self) -> Value {
        Value::String(self.as_str().to_string())
    }
}

/// Configuration of one OAuth 2 flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OAuthFlow {
    authorization_url: Option<String>,
    token_url: Option<String>,
    refresh_url: Option<String>,
    /// Scope names mapped to their descriptions.
    pub scopes: IndexMap<String, String>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl OAuthFlow {
    fn checked(url: String, field: &str) -> AppResult<Option<String>> {
        validate_url(&url, field)?;
        Ok(Some(url))
    }

    /// An implicit flow.
    pub fn implicit(authorization_url: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            authorization_url: Self::checked(
                authorization_url.into(),
                "OAuthFlow.authorizationUrl",
            )?,
            ..Default::default()
        })
    }

    /// A resource owner password flow.
    pub fn password(token_url: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            token_url: Self::checked(token_url.into(), "OAuthFlow.tokenUrl")?,
            ..Default::default()
        })
    }

    /// A client credentials flow.
    pub fn client_credentials(token_url: impl Into<String>) -> AppResult<Self> {
        Self::password(token_url)
    }

    /// An authorization code flow.
    pub fn authorization_code(
        authorization_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            authorization_url: Self::checked(
                authorization_url.into(),
                "OAuthFlow.authorizationUrl",
            )?,
            token_url: Self::checked(token_url.into(), "OAuthFlow.tokenUrl")?,
            ..Default::default()
        })
    }

    /// Sets the refresh URL.
    pub fn with_refresh_url(mut self, refresh_url: impl Into<String>) -> AppResult<Self> {
        self.refresh_url = Self::checked(refresh_url.into(), "OAuthFlow.refreshUrl")?;
        Ok(self)
    }

    /// Adds an available scope.
    pub fn with_scope(mut self, scope: impl Into<String>, description: impl Into<String>) -> Self {
        self.scopes.insert(scope.into(), description.into());
        self
    }

    /// The authorization URL, for implicit and authorization code flows.
    pub fn authorization_url(&self) -> Option<&str> {
        self.authorization_url.as_deref()
    }

    /// The token URL, for password, client credentials and authorization code flows.
    pub fn token_url(&self) -> Option<&str> {
        self.token_url.as_deref()
    }
}

impl ToDict for OAuthFlow {
    fn project(&self, out: &mut Projection) {
        out.field("authorization_url", &self.authorization_url)
            .field("token_url", &self.token_url)
            .field("refresh_url", &self.refresh_url);
        // `scopes` is required even when empty.
        out.raw("scopes", self.scopes.to_json())
            .extensions(&self.extensions);
    }
}

/// The OAuth 2 flows a scheme supports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OAuthFlows {
    /// Implicit flow.
    pub implicit: Option<OAuthFlow>,
    /// Resource owner password flow.
    pub password: Option<OAuthFlow>,
    /// Client credentials flow.
    pub client_credentials: Option<OAuthFlow>,
    /// Authorization code flow.
    pub authorization_code: Option<OAuthFlow>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl OAuthFlows {
    /// No flow configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the implicit flow.
    pub fn with_implicit(mut self, flow: OAuthFlow) -> Self {
        self.implicit = Some(flow);
        self
    }

    /// Sets the password flow.
    pub fn with_password(mut self, flow: OAuthFlow) -> Self {
        self.password = Some(flow);
        self
    }

    /// Sets the client credentials flow.
    pub fn with_client_credentials(mut self, flow: OAuthFlow) -> Self {
        self.client_credentials = Some(flow);
        self
    }

    /// Sets the authorization code flow.
    pub fn with_authorization_code(mut self, flow: OAuthFlow) -> Self {
        self.authorization_code = Some(flow);
        self
    }
}

impl ToDict for OAuthFlows {
    fn project(&self, out: &mut Projection) {
        out.model("implicit", self.implicit.as_ref())
            .model("password", self.password.as_ref())
            .model("client_credentials", self.client_credentials.as_ref())
            .model("authorization_code", self.authorization_code.as_ref())
            .extensions(&self.extensions);
    }
}

/// A security scheme usable by operations.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityScheme {
    scheme_type: SecuritySchemeType,
    /// Description.
    pub description: Option<String>,
    name: Option<String>,
    location: Option<ParameterLocation>,
    scheme: Option<String>,
    /// Hint about how a bearer token is formatted.
    pub bearer_format: Option<String>,
    flows: Option<OAuthFlows>,
    open_id_connect_url: Option<String>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl SecurityScheme {
    fn of_type(scheme_type: SecuritySchemeType) -> Self {
        Self {
            scheme_type,
            description: None,
            name: None,
            location: None,
            scheme: None,
            bearer_format: None,
            flows: None,
            open_id_connect_url: None,
            extensions: Extensions::new(),
        }
    }

    /// An API key sent as the header, query parameter or cookie `name`.
    pub fn api_key(name: impl Into<String>, location: ParameterLocation) -> AppResult<Self> {
        if location == ParameterLocation::Path {
            return Err(AppError::Validation(
                "An API key cannot be sent in the path".to_string(),
            ));
        }
        let mut scheme = Self::of_type(SecuritySchemeType::ApiKey);
        scheme.name = Some(name.into());
        scheme.location = Some(location);
        Ok(scheme)
    }

    /// HTTP authentication with the given scheme, e.g. `basic`.
    pub fn http(scheme: impl Into<String>) -> Self {
        let mut security = Self::of_type(SecuritySchemeType::Http);
        security.scheme = Some(scheme.into());
        security
    }

    /// HTTP bearer authentication.
    pub fn bearer() -> Self {
        Self::http("bearer")
    }

    /// OAuth 2 with the given flows.
    pub fn oauth2(flows: OAuthFlows) -> Self {
        let mut scheme = Self::of_type(SecuritySchemeType::OAuth2);
        scheme.flows = Some(flows);
        scheme
    }

    /// OpenID Connect discovery at `url`.
    pub fn open_id_connect(url: impl Into<String>) -> AppResult<Self> {
        let url = url.into();
        validate_url(&url, "SecurityScheme.openIdConnectUrl")?;
        let mut scheme = Self::of_type(SecuritySchemeType::OpenIdConnect);
        scheme.open_id_connect_url = Some(url);
        Ok(scheme)
    }

    /// Sets the bearer format.
    pub fn with_bearer_format(mut self, format: impl Into<String>) -> Self {
        self.bearer_format = Some(format.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The scheme kind.
    pub fn scheme_type(&self) -> SecuritySchemeType {
        self.scheme_type
    }
}

impl ToDict for SecurityScheme {
    fn project(&self, out: &mut Projection) {
        out.field("type", &self.scheme_type)
            .field("description", &self.description)
            .field("name", &self.name)
            .field("in", &self.location)
            .field("scheme", &self.scheme)
            .field("bearer_format", &self.bearer_format)
            .model("flows", self.flows.as_ref())
            .field("open_id_connect_url", &self.open_id_connect_url)
            .extensions(&self.extensions);
    }
}

/// Reusable objects of the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    /// Schemas by name.
    pub schemas: IndexMap<String, Schema>,
    /// Responses by name.
    pub responses: IndexMap<String, RefOr<ResponseObject>>,
    /// Parameters by name.
    pub parameters: IndexMap<String, RefOr<Parameter>>,
    /// Examples by name.
    pub examples: IndexMap<String, RefOr<Example>>,
    /// Request bodies by name.
    pub request_bodies: IndexMap<String, RefOr<RequestBody>>,
    /// Headers by name.
    pub headers: IndexMap<String, RefOr<Header>>,
    /// Security schemes by name.
    pub security_schemes: IndexMap<String, RefOr<SecurityScheme>>,
    /// Links by name.
    pub links: IndexMap<String, RefOr<Link>>,
    /// Callbacks by name.
    pub callbacks: IndexMap<String, RefOr<Callback>>,
    /// Specification extensions.
    pub extensions: Extensions,
}

impl Components {
    /// Empty components.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a schema under `name`.
    pub fn add_schema(&mut self, name: impl Into<String>, schema: Schema) -> &mut Self {
        self.schemas.insert(name.into(), schema);
        self
    }

    /// Adds a response under `name`.
    pub fn add_response(
        &mut self,
        name: impl Into<String>,
        response: impl Into<RefOr<ResponseObject>>,
    ) -> &mut Self {
        self.responses.insert(name.into(), response.into());
        self
    }

    /// Adds a parameter under `name`.
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        parameter: impl Into<RefOr<Parameter>>,
    ) -> &mut Self {
        self.parameters.insert(name.into(), parameter.into());
        self
    }

    /// Adds an example under `name`.
    pub fn add_example(
        &mut self,
        name: impl Into<String>,
        example: impl Into<RefOr<Example>>,
    ) -> &mut Self {
        self.examples.insert(name.into(), example.into());
        self
    }

    /// Adds a request body under `name`.
    pub fn add_request_body(
        &mut self,
        name: impl Into<String>,
        body: impl Into<RefOr<RequestBody>>,
    ) -> &mut Self {
        self.request_bodies.insert(name.into(), body.into());
        self
    }

    /// Adds a header under `name`.
    pub fn add_header(
        &mut self,
        name: impl Into<String>,
        header: impl Into<RefOr<Header>>,
    ) -> &mut Self {
        self.headers.insert(name.into(), header.into());
        self
    }

    /// Adds a security scheme under `name`.
    pub fn add_security_scheme(
        &mut self,
        name: impl Into<String>,
        scheme: impl Into<RefOr<SecurityScheme>>,
    ) -> &mut Self {
        self.security_schemes.insert(name.into(), scheme.into());
        self
    }

    /// Adds a link under `name`.
    pub fn add_link(&mut self, name: impl Into<String>, link: impl Into<RefOr<Link>>) -> &mut Self {
        self.links.insert(name.into(), link.into());
        self
    }

    /// Adds a callback under `name`.
    pub fn add_callback(
        &mut self,
        name: impl Into<String>,
        callback: impl Into<RefOr<Callback>>,
    ) -> &mut Self {
        self.callbacks.insert(name.into(), callback.into());
        self
    }

    /// Adds the schemas in `schemas` whose names are not present yet.
    pub fn fill_schemas(&mut self, schemas: IndexMap<String, Schema>) {
        for (name, schema) in schemas {
            self.schemas.entry(name).or_insert(schema);
        }
    }
}

impl ToDict for Components {
    fn project(&self, out: &mut Projection) {
        out.model_map("schemas", &self.schemas)
            .model_map("responses", &self.responses)
            .model_map("parameters", &self.parameters)
            .model_map("examples", &self.examples)
            .model_map("request_bodies", &self.request_bodies)
            .model_map("headers", &self.headers)
            .model_map("security_schemes", &self.security_schemes)
            .model_map("links", &self.links)
            .model_map("callbacks", &self.callbacks)
            .extensions(&self.extensions);
    }
}

impl_extensible!(OAuthFlow, OAuthFlows, SecurityScheme, Components);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_api_key_scheme() {
        let scheme = SecurityScheme::api_key("X-API-Key", ParameterLocation::Header).unwrap();
        assert_eq!(
            scheme.to_value(),
            json!({"type": "apiKey", "name": "X-API-Key", "in": "header"})
        );
        assert!(SecurityScheme::api_key("key", ParameterLocation::Path).is_err());
    }

    #[test]
    fn test_bearer_scheme() {
        let scheme = SecurityScheme::bearer().with_bearer_format("JWT");
        assert_eq!(
            scheme.to_value(),
            json!({"type": "http", "scheme": "bearer", "bearerFormat": "JWT"})
        );
    }

    #[test]
    fn test_oauth2_flows() {
        let flow = OAuthFlow::authorization_code(
            "https://auth.example.com/authorize",
            "https://auth.example.com/token",
        )
        .unwrap()
        .with_scope("read:pets", "Read pets");
        let scheme = SecurityScheme::oauth2(OAuthFlows::new().with_authorization_code(flow));
        assert_eq!(
            scheme.to_value(),
            json!({
                "type": "oauth2",
                "flows": {
                    "authorizationCode": {
                        "authorizationUrl": "https://auth.example.com/authorize",
                        "tokenUrl": "https://auth.example.com/token",
                        "scopes": {"read:pets": "Read pets"}
                    }
                }
            })
        );
    }

    #[test]
    fn test_flow_and_discovery_urls_are_validated() {
        assert!(OAuthFlow::implicit("not a url").is_err());
        assert!(OAuthFlow::password("https://a.example.com/token")
            .unwrap()
            .with_refresh_url("/refresh")
            .is_err());
        assert!(matches!(
            SecurityScheme::open_id_connect("openid"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_components_projection_keeps_names_verbatim() {
        let mut components = Components::new();
        components
            .add_schema("Pet_Record", Schema::object())
            .add_example("cat", Example::new(json!({"name": "Tom"})))
            .add_security_scheme("basic_auth", SecurityScheme::http("basic"));
        assert_eq!(
            components.to_value(),
            json!({
                "schemas": {"Pet_Record": {"type": "object"}},
                "examples": {"cat": {"value": {"name": "Tom"}}},
                "securitySchemes": {"basic_auth": {"type": "http", "scheme": "basic"}}
            })
        );
    }

    #[test]
    fn test_fill_schemas_keeps_explicit_entries() {
        let mut components = Components::new();
        components.add_schema("Pet", Schema::object().with_title("explicit"));
        let mut registered = IndexMap::new();
        registered.insert("Pet".to_string(), Schema::object());
        registered.insert("Owner".to_string(), Schema::object());
        components.fill_schemas(registered);
        assert_eq!(components.schemas.len(), 2);
        assert_eq!(components.schemas["Pet"].title.as_deref(), Some("explicit"));
    }
}
