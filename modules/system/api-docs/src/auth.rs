use axum::http::Method;
use axum::response::IntoResponse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use docs_authn::{AuthNClient, AuthNError};
use docs_security::SecurityContext;

use crate::problem::Problem;

/// Path matcher for one HTTP method.
#[derive(Clone)]
pub struct RouteMatcher {
    matcher: matchit::Router<()>,
}

impl RouteMatcher {
    fn new() -> Self {
        Self {
            matcher: matchit::Router::new(),
        }
    }

    fn insert(&mut self, path: &str) -> Result<(), matchit::InsertError> {
        self.matcher.insert(path, ())
    }

    fn find(&self, path: &str) -> bool {
        self.matcher.at(path).is_ok()
    }
}

/// Whether a route requires authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequirement {
    /// Public route: the caller runs as anonymous, credentials are not looked at.
    None,
    /// A valid bearer token is required.
    Required,
}

/// Decides per (method, path) whether the auth middleware authenticates.
#[derive(Clone)]
pub struct GatewayRoutePolicy {
    route_matchers: Arc<HashMap<Method, RouteMatcher>>,
    public_matchers: Arc<HashMap<Method, RouteMatcher>>,
    require_auth_by_default: bool,
}

impl GatewayRoutePolicy {
    #[must_use]
    pub fn new(
        route_matchers: Arc<HashMap<Method, RouteMatcher>>,
        public_matchers: Arc<HashMap<Method, RouteMatcher>>,
        require_auth_by_default: bool,
    ) -> Self {
        Self {
            route_matchers,
            public_matchers,
            require_auth_by_default,
        }
    }

    /// Resolve the authentication requirement for a given (method, path).
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> AuthRequirement {
        let is_authenticated = self
            .route_matchers
            .get(method)
            .is_some_and(|matcher| matcher.find(path));

        let is_public = self
            .public_matchers
            .get(method)
            .is_some_and(|matcher| matcher.find(path));

        // Public routes are not forced to auth by default
        let needs_authn = is_authenticated || (self.require_auth_by_default && !is_public);

        if needs_authn {
            AuthRequirement::Required
        } else {
            AuthRequirement::None
        }
    }
}

/// Shared state for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub authn_client: Arc<dyn AuthNClient>,
    pub route_policy: GatewayRoutePolicy,
}

fn build_matchers(
    routes: HashSet<(Method, String)>,
    kind: &str,
) -> anyhow::Result<HashMap<Method, RouteMatcher>> {
    let mut matchers: HashMap<Method, RouteMatcher> = HashMap::new();
    // Patterns use axum 0.8 `{param}` syntax, which matchit shares
    for (method, path) in routes {
        matchers
            .entry(method)
            .or_insert_with(RouteMatcher::new)
            .insert(&path)
            .map_err(|e| anyhow::anyhow!("Failed to insert {kind} route pattern '{path}': {e}"))?;
    }
    Ok(matchers)
}

/// Build a `GatewayRoutePolicy` from the explicitly authenticated and public routes.
///
/// # Errors
/// Returns an error if a path pattern cannot be inserted (e.g. conflicting parameters).
pub fn build_route_policy(
    cfg: &crate::config::ApiDocsConfig,
    authenticated_routes: HashSet<(Method, String)>,
    public_routes: HashSet<(Method, String)>,
) -> anyhow::Result<GatewayRoutePolicy> {
    let route_matchers = build_matchers(authenticated_routes, "authenticated")?;
    let public_matchers = build_matchers(public_routes, "public")?;

    Ok(GatewayRoutePolicy::new(
        Arc::new(route_matchers),
        Arc::new(public_matchers),
        cfg.require_auth_by_default,
    ))
}

/// Authentication middleware backed by an [`AuthNClient`].
///
/// For each request:
/// 1. Skips CORS preflight requests
/// 2. Resolves the route's auth requirement via `GatewayRoutePolicy`
/// 3. For public routes: inserts anonymous `SecurityContext`, ignoring any credentials
/// 4. For required routes: extracts bearer token, calls the client, inserts `SecurityContext`
pub async fn authn_middleware(
    axum::extract::State(state): axum::extract::State<AuthState>,
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    if is_preflight_request(req.method(), req.headers()) {
        return next.run(req).await;
    }

    let requirement = state.route_policy.resolve(req.method(), req.uri().path());

    match requirement {
        AuthRequirement::None => {
            req.extensions_mut().insert(SecurityContext::anonymous());
            next.run(req).await
        }
        AuthRequirement::Required => {
            let Some(token) = extract_bearer_token(req.headers()) else {
                return Problem::new(
                    axum::http::StatusCode::UNAUTHORIZED,
                    "Unauthorized",
                    "Missing or invalid Authorization header",
                )
                .with_instance(req.uri().path())
                .into_response();
            };

            match state.authn_client.authenticate(token).await {
                Ok(result) => {
                    req.extensions_mut().insert(result.security_context);
                    next.run(req).await
                }
                Err(err) => authn_error_to_response(&err, req.uri().path()),
            }
        }
    }
}

/// Convert `AuthNError` to an RFC 9457 Problem Details response.
fn authn_error_to_response(err: &AuthNError, path: &str) -> axum::response::Response {
    log_authn_error(err);
    let (status, title, detail) = match err {
        AuthNError::Unauthorized(_) => (
            axum::http::StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Authentication failed",
        ),
        AuthNError::ServiceUnavailable(_) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "Service Unavailable",
            "Authentication service unavailable",
        ),
        AuthNError::Internal(_) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Internal authentication error",
        ),
    };
    Problem::new(status, title, detail)
        .with_instance(path)
        .into_response()
}

/// Cognitive complexity is inflated by tracing macro expansion.
#[allow(clippy::cognitive_complexity)]
fn log_authn_error(err: &AuthNError) {
    match err {
        AuthNError::Unauthorized(msg) => tracing::debug!("AuthN rejected: {msg}"),
        AuthNError::ServiceUnavailable(msg) => {
            tracing::error!("AuthN service unavailable: {msg}");
        }
        AuthNError::Internal(msg) => tracing::error!("AuthN internal error: {msg}"),
    }
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
}

/// Preflight requests are OPTIONS requests carrying both `Origin` and
/// `Access-Control-Request-Method`.
fn is_preflight_request(method: &Method, headers: &axum::http::HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(axum::http::header::ORIGIN)
        && headers.contains_key(axum::http::header::ACCESS_CONTROL_REQUEST_METHOD)
}
