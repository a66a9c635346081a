//! Static token resolver.

use std::collections::HashMap;

use async_trait::async_trait;
use docs_security::SecurityContext;

use crate::api::AuthNClient;
use crate::config::{AuthNMode, IdentityConfig, StaticAuthNConfig};
use crate::error::AuthNError;
use crate::models::AuthenticationResult;

/// Resolves bearer tokens against configuration:
/// - `accept_all`: any non-empty token maps to the default identity
/// - `static_tokens`: specific tokens map to specific identities
pub struct StaticAuthN {
    mode: AuthNMode,
    default_identity: IdentityConfig,
    token_map: HashMap<String, IdentityConfig>,
}

impl StaticAuthN {
    #[must_use]
    pub fn from_config(cfg: &StaticAuthNConfig) -> Self {
        let token_map: HashMap<String, IdentityConfig> = cfg
            .tokens
            .iter()
            .map(|m| (m.token.clone(), m.identity.clone()))
            .collect();

        tracing::debug!(
            mode = ?cfg.mode,
            tokens = token_map.len(),
            "Static AuthN resolver configured"
        );

        Self {
            mode: cfg.mode.clone(),
            default_identity: cfg.default_identity.clone(),
            token_map,
        }
    }

    /// Look up the identity for `bearer_token`.
    ///
    /// Returns `None` for an empty token, or an unknown one in `static_tokens` mode.
    #[must_use]
    pub fn resolve(&self, bearer_token: &str) -> Option<AuthenticationResult> {
        if bearer_token.is_empty() {
            return None;
        }

        let identity = match &self.mode {
            AuthNMode::AcceptAll => &self.default_identity,
            AuthNMode::StaticTokens => self.token_map.get(bearer_token)?,
        };

        Some(build_result(identity, bearer_token))
    }
}

#[async_trait]
impl AuthNClient for StaticAuthN {
    async fn authenticate(&self, bearer_token: &str) -> Result<AuthenticationResult, AuthNError> {
        self.resolve(bearer_token)
            .ok_or_else(|| AuthNError::Unauthorized("invalid token".to_owned()))
    }
}

fn build_result(identity: &IdentityConfig, bearer_token: &str) -> AuthenticationResult {
    let ctx = SecurityContext::builder()
        .subject_id(identity.subject_id)
        .subject_tenant_id(identity.subject_tenant_id)
        .token_scopes(identity.token_scopes.clone())
        .bearer_token(bearer_token.to_owned())
        .build();

    AuthenticationResult {
        security_context: ctx,
    }
}
