//! API docs gateway definition
//!
//! Owns the HTTP server, mounts the schema and docs views next to the host
//! API, and applies the middleware stack.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use arc_swap::ArcSwap;
use axum::http::Method;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tokio_util::sync::CancellationToken;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::field::Empty;
use utoipa::openapi::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

use docs_authn::AuthNClient;
use docs_security::SecurityContext;
use docs_security::constants::{DEFAULT_SUBJECT_ID, DEFAULT_TENANT_ID};

use crate::auth;
use crate::config::ApiDocsConfig;
use crate::middleware;
use crate::views::{
    DocsView, MountedView, PublicDocsView, PublicSchemaView, SchemaView, View, ViewError,
};
use crate::web;

/// Name of the security scheme added to the served document.
pub const BEARER_SCHEME: &str = "bearerAuth";

/// Routes that never require authentication.
const BUILTIN_PUBLIC_ROUTES: [&str; 2] = ["/health", "/healthz"];

/// Methods answered by a GET route; axum serves HEAD from the GET handler.
const VIEW_METHODS: [Method; 2] = [Method::GET, Method::HEAD];

pub struct ApiDocsGateway {
    // Read-mostly config
    config: ArcSwap<ApiDocsConfig>,
    // None only makes sense with `auth_disabled`
    authn_client: Option<Arc<dyn AuthNClient>>,
}

impl ApiDocsGateway {
    #[must_use]
    pub fn new(config: ApiDocsConfig, authn_client: Option<Arc<dyn AuthNClient>>) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            authn_client,
        }
    }

    #[must_use]
    pub fn get_config(&self) -> ApiDocsConfig {
        (**self.config.load()).clone()
    }

    /// Replace the configuration used by subsequent `build_*` calls.
    pub fn update_config(&self, config: ApiDocsConfig) {
        self.config.store(Arc::new(config));
    }

    /// Finalize the host's `OpenAPI` document: apply the configured metadata
    /// overrides and register the bearer security scheme.
    #[must_use]
    pub fn build_openapi(&self, mut doc: OpenApi) -> OpenApi {
        let config = self.config.load();
        if let Some(title) = &config.openapi.title {
            doc.info.title.clone_from(title);
        }
        if let Some(version) = &config.openapi.version {
            doc.info.version.clone_from(version);
        }
        if let Some(description) = &config.openapi.description {
            doc.info.description = Some(description.clone());
        }

        doc.components
            .get_or_insert_with(utoipa::openapi::Components::default)
            .add_security_scheme(
                BEARER_SCHEME,
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );

        tracing::info!(
            title = %doc.info.title,
            version = %doc.info.version,
            paths = doc.paths.paths.len(),
            "Built OpenAPI document"
        );
        doc
    }

    /// Construct the schema and docs views for `doc` as configured.
    ///
    /// With `docs.public` the public adapters are used; otherwise the plain
    /// views, which require an authenticated caller.
    ///
    /// # Errors
    /// Returns an error if a path is invalid, collides with the health checks,
    /// another view or a path of `doc`, or the docs template fails to load.
    pub fn docs_views(&self, doc: Arc<OpenApi>) -> Result<Vec<MountedView>, ViewError> {
        let config = self.config.load();
        let docs = &config.docs;
        if docs.schema_path == docs.docs_path {
            return Err(ViewError::DuplicatePath(docs.schema_path.clone()));
        }
        for path in [&docs.schema_path, &docs.docs_path] {
            if BUILTIN_PUBLIC_ROUTES.contains(&path.as_str())
                || doc.paths.paths.contains_key(path.as_str())
            {
                return Err(ViewError::DuplicatePath(path.clone()));
            }
        }

        let title = docs.title.clone().unwrap_or_else(|| doc.info.title.clone());
        let schema_view = SchemaView::new(doc);
        let docs_view = DocsView::new(title, &docs.schema_path, &docs.swagger_ui_dist)?;

        let (schema, ui): (Arc<dyn View>, Arc<dyn View>) = if docs.public {
            (
                Arc::new(PublicSchemaView::new(schema_view)),
                Arc::new(PublicDocsView::new(docs_view)),
            )
        } else {
            (Arc::new(schema_view), Arc::new(docs_view))
        };

        Ok(vec![
            MountedView::new(&docs.schema_path, schema)?,
            MountedView::new(&docs.docs_path, ui)?,
        ])
    }

    /// Public routes are the built-in health checks plus every view whose
    /// permission does not require authentication; the other views are
    /// explicitly authenticated.
    fn build_route_policy(&self, views: &[MountedView]) -> Result<auth::GatewayRoutePolicy> {
        let mut authenticated_routes = HashSet::new();
        let mut public_routes: HashSet<(Method, String)> = BUILTIN_PUBLIC_ROUTES
            .iter()
            .flat_map(|p| VIEW_METHODS.map(|m| (m, (*p).to_owned())))
            .collect();

        for mounted in views {
            let target = if mounted.requires_authentication() {
                &mut authenticated_routes
            } else {
                &mut public_routes
            };
            target.extend(VIEW_METHODS.map(|m| (m, mounted.path.clone())));
            tracing::debug!(
                view = mounted.view.name(),
                path = %mounted.path,
                permission = mounted.view.permission().name(),
                "Mounted view"
            );
        }

        let config = self.config.load();
        let authenticated_routes_count = authenticated_routes.len();
        let public_routes_count = public_routes.len();
        let route_policy = auth::build_route_policy(&config, authenticated_routes, public_routes)?;

        tracing::info!(
            auth_disabled = config.auth_disabled,
            require_auth_by_default = config.require_auth_by_default,
            authenticated_routes = authenticated_routes_count,
            public_routes = public_routes_count,
            "Route policy initialized"
        );

        Ok(route_policy)
    }

    /// Apply all middleware layers to a router (request ID, tracing, timeout, body limit, auth)
    fn apply_middleware_stack(
        &self,
        mut router: Router,
        route_policy: auth::GatewayRoutePolicy,
    ) -> Result<Router> {
        // `Router::layer` wraps: the last added layer is the outermost and runs first.
        //
        // Desired request execution order (outermost -> innermost):
        // SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions
        // -> Timeout -> BodyLimit -> Auth -> Router
        //
        // Layers are therefore added innermost first below.

        let config = self.get_config();

        // 6) Auth
        if config.auth_disabled {
            let default_security_context = SecurityContext::builder()
                .subject_id(DEFAULT_SUBJECT_ID)
                .subject_tenant_id(DEFAULT_TENANT_ID)
                .token_scopes(vec!["*".to_owned()])
                .build();

            tracing::warn!(
                "API docs gateway auth is DISABLED: all requests run with the default subject. \
                 Intended only for single-user local setups."
            );
            router = router.layer(from_fn(
                move |mut req: axum::extract::Request, next: axum::middleware::Next| {
                    let sec_context = default_security_context.clone();
                    async move {
                        req.extensions_mut().insert(sec_context);
                        next.run(req).await
                    }
                },
            ));
        } else if let Some(client) = &self.authn_client {
            let auth_state = auth::AuthState {
                authn_client: Arc::clone(client),
                route_policy,
            };
            router = router.layer(from_fn_with_state(auth_state, auth::authn_middleware));
        } else {
            return Err(anyhow::anyhow!(
                "auth is enabled but no AuthN client was provided; \
                 pass one to `ApiDocsGateway::new` or set `auth_disabled: true`"
            ));
        }

        // 5) Body limit
        router = router.layer(RequestBodyLimitLayer::new(config.defaults.body_limit_bytes));
        router = router.layer(DefaultBodyLimit::max(config.defaults.body_limit_bytes));

        // 4) Timeout
        router = router.layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::GATEWAY_TIMEOUT,
            Duration::from_secs(config.defaults.request_timeout_secs),
        ));

        // 3) Record request_id into span + extensions (must be inner to Trace)
        router = router.layer(from_fn(middleware::request_id::push_req_id_to_extensions));

        // 2) Trace
        router = router.layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<axum::body::Body>| {
                    let hdr = middleware::request_id::header();
                    let rid = req
                        .headers()
                        .get(&hdr)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("n/a");

                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        version = ?req.version(),
                        module = "api_docs",
                        request_id = %rid,
                        status = Empty,
                        latency_ms = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<axum::body::Body>,
                     latency: Duration,
                     span: &tracing::Span| {
                        span.record("status", res.status().as_u16());
                        span.record("latency_ms", latency.as_millis());
                    },
                ),
        );

        // 1) Request ID handling: generate if missing, then echo on the response.
        let x_request_id = middleware::request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(
            x_request_id,
            middleware::request_id::MakeReqId,
        ));

        Ok(router)
    }

    /// Build the complete router: the host API, health checks, the schema
    /// and docs views, and the middleware stack.
    ///
    /// `api_doc` is the host API's `OpenAPI` document.
    ///
    /// # Errors
    /// Returns an error if the views or the route policy cannot be built, or
    /// auth is enabled without an AuthN client.
    pub fn build_router(&self, api_router: Router, api_doc: OpenApi) -> Result<Router> {
        let config = self.get_config();

        let mut router = api_router
            .route("/health", get(web::health_check))
            .route("/healthz", get(|| async { "ok" }));

        let views = if config.enable_docs {
            let doc = Arc::new(self.build_openapi(api_doc));
            self.docs_views(doc)?
        } else {
            tracing::info!("Docs disabled; schema and docs views are not mounted");
            Vec::new()
        };

        for mounted in &views {
            router = mounted.mount(router);
        }

        let route_policy = self.build_route_policy(&views)?;
        self.apply_middleware_stack(router, route_policy)
    }

    fn parse_bind_address(bind_addr: &str) -> Result<SocketAddr> {
        bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{bind_addr}': {e}"))
    }

    /// Bind and serve `router` until `cancel` fires.
    ///
    /// # Errors
    /// Returns an error if the bind address is invalid, binding fails, or the server errors.
    pub async fn serve(&self, router: Router, cancel: CancellationToken) -> Result<()> {
        let addr = Self::parse_bind_address(&self.config.load().bind_addr)?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server bound on {}", addr);

        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}
