#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Bearer token authentication for the API docs gateway.
//!
//! - [`AuthNClient`] - trait the gateway calls for every protected request
//! - [`AuthenticationResult`] - the validated identity
//! - [`AuthNError`] - failure kinds, mapped by the gateway to HTTP problems
//! - [`StaticAuthN`] - token table resolver configured from [`StaticAuthNConfig`]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod static_authn;

pub use api::AuthNClient;
pub use config::{AuthNMode, IdentityConfig, StaticAuthNConfig, TokenMapping};
pub use error::AuthNError;
pub use models::AuthenticationResult;
pub use static_authn::StaticAuthN;
