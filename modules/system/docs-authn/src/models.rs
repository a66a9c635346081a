use docs_security::SecurityContext;

/// Result of a successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// Validated identity, including the original bearer token.
    pub security_context: SecurityContext,
}
