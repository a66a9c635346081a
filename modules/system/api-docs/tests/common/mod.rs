#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Shared fixtures: a host API, a counting AuthN client and request helpers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use api_docs::{ApiDocsConfig, ApiDocsGateway};
use async_trait::async_trait;
use axum::{
    Extension, Json, Router,
    body::Body,
    http::{Request, Response, header},
    routing::get,
};
use docs_authn::{
    AuthNClient, AuthNError, AuthNMode, AuthenticationResult, IdentityConfig, StaticAuthN,
    StaticAuthNConfig, TokenMapping,
};
use docs_security::SecurityContext;
use tower::ServiceExt;
use utoipa::OpenApi;
use uuid::{Uuid, uuid};

pub const VALID_TOKEN: &str = "valid-token";
pub const READER_SUBJECT_ID: Uuid = uuid!("aaaaaaaa-0000-0000-0000-000000000001");
pub const READER_TENANT_ID: Uuid = uuid!("bbbbbbbb-0000-0000-0000-000000000001");

/// Wraps [`StaticAuthN`] and counts how often the gateway asked it.
#[derive(Clone)]
pub struct CountingAuthN {
    inner: Arc<StaticAuthN>,
    calls: Arc<AtomicUsize>,
}

impl CountingAuthN {
    pub fn new() -> Self {
        let cfg = StaticAuthNConfig {
            mode: AuthNMode::StaticTokens,
            tokens: vec![TokenMapping {
                token: VALID_TOKEN.to_owned(),
                identity: IdentityConfig {
                    subject_id: READER_SUBJECT_ID,
                    subject_tenant_id: READER_TENANT_ID,
                    token_scopes: vec!["docs:read".to_owned()],
                },
            }],
            ..StaticAuthNConfig::default()
        };
        Self {
            inner: Arc::new(StaticAuthN::from_config(&cfg)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthNClient for CountingAuthN {
    async fn authenticate(&self, bearer_token: &str) -> Result<AuthenticationResult, AuthNError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.authenticate(bearer_token).await
    }
}

/// List books visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/books",
    tag = "books",
    responses((status = 200, description = "Books visible to the caller")),
    security(("bearerAuth" = []))
)]
pub async fn list_books(Extension(ctx): Extension<SecurityContext>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "subject_id": ctx.subject_id(),
        "anonymous": ctx.is_anonymous(),
        "books": ["Dune", "Solaris"],
    }))
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Library API", version = "1.0.0"),
    paths(list_books)
)]
pub struct LibraryApi;

pub fn host_router() -> Router {
    Router::new().route("/api/v1/books", get(list_books))
}

/// Build the full gateway router with `config` and a fresh counting client.
pub fn app(config: ApiDocsConfig) -> (Router, CountingAuthN) {
    let authn = CountingAuthN::new();
    let client: Arc<dyn AuthNClient> = Arc::new(authn.clone());
    let gateway = ApiDocsGateway::new(config, Some(client));
    let router = gateway
        .build_router(host_router(), LibraryApi::openapi())
        .unwrap();
    (router, authn)
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub fn request(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

pub fn get_with_auth(uri: &str, authorization: &str) -> Request<Body> {
    request(uri)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
