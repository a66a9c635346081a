//! Authorization predicates attached to views.

use async_trait::async_trait;
use axum::http::request::Parts;
use docs_security::SecurityContext;

/// What a permission gets to look at when deciding.
pub struct PermissionContext<'a> {
    pub parts: &'a Parts,
    pub security: &'a SecurityContext,
}

/// Per-view rule deciding whether a caller may invoke the view.
#[async_trait]
pub trait Permission: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the gateway has to authenticate the caller before this
    /// permission is evaluated.
    ///
    /// Routes guarded by a permission returning `false` are public: the auth
    /// middleware does not call the authentication backend for them, so
    /// credentials on those requests are neither checked nor rejected.
    fn requires_authentication(&self) -> bool {
        true
    }

    async fn has_permission(&self, ctx: &PermissionContext<'_>) -> bool;
}

/// Permits every request, whatever credentials it carries.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAny;

#[async_trait]
impl Permission for AllowAny {
    fn name(&self) -> &'static str {
        "allow_any"
    }

    fn requires_authentication(&self) -> bool {
        false
    }

    async fn has_permission(&self, _ctx: &PermissionContext<'_>) -> bool {
        true
    }
}

/// Permits requests with an authenticated subject.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAuthenticated;

#[async_trait]
impl Permission for IsAuthenticated {
    fn name(&self) -> &'static str {
        "is_authenticated"
    }

    async fn has_permission(&self, ctx: &PermissionContext<'_>) -> bool {
        !ctx.security.is_anonymous()
    }
}
