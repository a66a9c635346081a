//! Client trait consumed by the gateway's auth middleware.

use async_trait::async_trait;

use crate::error::AuthNError;
use crate::models::AuthenticationResult;

/// Validates bearer tokens.
///
/// The gateway only calls this for routes whose permission requires an
/// authenticated caller; public routes never reach it.
#[async_trait]
pub trait AuthNClient: Send + Sync {
    /// Authenticate a bearer token and return the validated identity.
    ///
    /// `bearer_token` is the raw token, without the `Bearer ` prefix.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if the token is empty, unknown, or malformed
    /// - `ServiceUnavailable` if the backend cannot answer right now
    /// - `Internal` for unexpected failures
    async fn authenticate(&self, bearer_token: &str) -> Result<AuthenticationResult, AuthNError>;
}
