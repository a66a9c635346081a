use thiserror::Error;

/// Errors returned by an [`AuthNClient`](crate::AuthNClient).
#[derive(Debug, Error)]
pub enum AuthNError {
    /// The token is invalid, expired, or malformed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The backend is not able to answer right now.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}
