//! Views: a GET operation guarded by a permission.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use docs_security::SecurityContext;

use crate::permission::{Permission, PermissionContext};
use crate::problem::Problem;

mod docs;
mod public;
mod schema;

pub use docs::DocsView;
pub use public::{PublicDocsView, PublicSchemaView};
pub use schema::{SchemaFormat, SchemaView};

/// Errors raised while constructing views.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("invalid docs template: {0}")]
    Template(#[from] minijinja::Error),
    #[error("invalid mount path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
    #[error("mount path '{0}' is already routed")]
    DuplicatePath(String),
}

#[async_trait]
pub trait View: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// The authorization predicate evaluated before [`View::get`].
    fn permission(&self) -> &dyn Permission;

    /// Handle a GET request the permission has admitted.
    async fn get(&self, parts: &Parts) -> Response;
}

/// A view together with the path it is served on.
#[derive(Clone)]
pub struct MountedView {
    pub path: String,
    pub view: Arc<dyn View>,
}

impl MountedView {
    /// # Errors
    /// Returns [`ViewError::InvalidPath`] if `path` does not start with `/` or
    /// is not a valid route pattern.
    pub fn new(path: impl Into<String>, view: Arc<dyn View>) -> Result<Self, ViewError> {
        let path = path.into();
        if !path.starts_with('/') {
            return Err(ViewError::InvalidPath {
                path,
                reason: "must start with '/'".to_owned(),
            });
        }
        // axum 0.8 panics on the pre-0.8 `:param` / `*rest` segment syntax
        if path
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
        {
            return Err(ViewError::InvalidPath {
                path,
                reason: "use `{param}` / `{*rest}` instead of `:param` / `*rest`".to_owned(),
            });
        }
        // Same pattern syntax the router and the route policy use
        if let Err(e) = matchit::Router::new().insert(path.as_str(), ()) {
            return Err(ViewError::InvalidPath {
                path,
                reason: e.to_string(),
            });
        }
        Ok(Self { path, view })
    }

    /// Whether the auth middleware must authenticate callers of this view.
    #[must_use]
    pub fn requires_authentication(&self) -> bool {
        self.view.permission().requires_authentication()
    }

    /// Register `GET path` on `router`.
    #[must_use]
    pub fn mount(&self, router: Router) -> Router {
        let view = Arc::clone(&self.view);
        router.route(
            &self.path,
            get(move |req: Request| async move { dispatch(view.as_ref(), req).await }),
        )
    }
}

/// Evaluate the view's permission against the caller and run the view.
///
/// The caller is the `SecurityContext` the auth middleware put in the request
/// extensions; a request without one is treated as anonymous.
pub async fn dispatch(view: &dyn View, req: Request) -> Response {
    let (parts, _body) = req.into_parts();
    let anonymous = SecurityContext::anonymous();
    let security = parts
        .extensions
        .get::<SecurityContext>()
        .unwrap_or(&anonymous);

    let permission = view.permission();
    let ctx = PermissionContext {
        parts: &parts,
        security,
    };
    if !permission.has_permission(&ctx).await {
        tracing::debug!(
            view = view.name(),
            permission = permission.name(),
            anonymous = security.is_anonymous(),
            path = %parts.uri.path(),
            "View permission denied"
        );
        return permission_denied(security, parts.uri.path());
    }

    view.get(&parts).await
}

fn permission_denied(security: &SecurityContext, path: &str) -> Response {
    let problem = if security.is_anonymous() {
        Problem::new(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Authentication credentials were not provided",
        )
    } else {
        Problem::new(
            StatusCode::FORBIDDEN,
            "Forbidden",
            "You do not have permission to perform this action",
        )
    };
    problem.with_instance(path).into_response()
}
