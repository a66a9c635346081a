use serde::{Deserialize, Serialize};

fn default_bind_addr() -> String {
    "127.0.0.1:8087".to_owned()
}

fn default_body_limit_bytes() -> usize {
    2 * 1024 * 1024
}

/// API docs gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiDocsConfig {
    pub bind_addr: String,

    /// Mount the schema and docs views.
    pub enable_docs: bool,

    /// Where and how the schema and docs views are mounted
    pub docs: DocsConfig,

    /// Overrides for the `OpenAPI` document metadata
    pub openapi: OpenApiConfig,

    /// Global defaults
    pub defaults: Defaults,

    /// Disable authentication completely.
    /// When true, middleware injects a default `SecurityContext` into every request.
    /// Only meant for single-user local setups.
    pub auth_disabled: bool,

    /// If true, routes that are not explicitly public still require authentication.
    pub require_auth_by_default: bool,
}

impl Default for ApiDocsConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            enable_docs: true,
            docs: DocsConfig::default(),
            openapi: OpenApiConfig::default(),
            defaults: Defaults::default(),
            auth_disabled: false,
            require_auth_by_default: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct DocsConfig {
    /// Serve the schema and docs without authentication.
    /// When false the plain views are mounted and require a bearer token.
    pub public: bool,
    /// Path of the schema view
    pub schema_path: String,
    /// Path of the Swagger UI view
    pub docs_path: String,
    /// Base URL of the `swagger-ui-dist` package the docs page loads assets from
    pub swagger_ui_dist: String,
    /// Page title; defaults to the document title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            public: true,
            schema_path: "/api/schema/".to_owned(),
            docs_path: "/api/docs/".to_owned(),
            swagger_ui_dist: "https://cdn.jsdelivr.net/npm/swagger-ui-dist@5".to_owned(),
            title: None,
        }
    }
}

/// `OpenAPI` document metadata. Unset fields keep the host document's values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct OpenApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Defaults {
    /// Global request body size limit in bytes
    pub body_limit_bytes: usize,
    /// Per-request timeout in seconds; exceeded requests get 504
    pub request_timeout_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            body_limit_bytes: default_body_limit_bytes(),
            request_timeout_secs: 30,
        }
    }
}
