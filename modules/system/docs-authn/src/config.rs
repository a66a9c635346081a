//! Configuration for the static token resolver.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docs_security::constants::{DEFAULT_SUBJECT_ID, DEFAULT_TENANT_ID};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticAuthNConfig {
    /// Authentication mode.
    pub mode: AuthNMode,

    /// Identity returned in `accept_all` mode.
    pub default_identity: IdentityConfig,

    /// Token-to-identity mappings for `static_tokens` mode.
    pub tokens: Vec<TokenMapping>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthNMode {
    /// Accept any non-empty token and return the default identity.
    #[default]
    AcceptAll,
    /// Map specific tokens to specific identities.
    StaticTokens,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    pub subject_id: Uuid,
    pub subject_tenant_id: Uuid,
    /// `["*"]` means first-party / unrestricted.
    pub token_scopes: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            subject_id: DEFAULT_SUBJECT_ID,
            subject_tenant_id: DEFAULT_TENANT_ID,
            token_scopes: vec!["*".to_owned()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TokenMapping {
    /// Bearer token value to match.
    pub token: String,
    pub identity: IdentityConfig,
}
