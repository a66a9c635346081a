#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! API docs gateway.
//!
//! Serves the `OpenAPI` document of a host API and a Swagger UI page for it,
//! next to the host's own routes, behind bearer token authentication.
//!
//! Every endpoint is a [`views::View`] carrying a [`permission::Permission`].
//! The framework [`views::SchemaView`] and [`views::DocsView`] require an
//! authenticated caller; [`views::PublicSchemaView`] and
//! [`views::PublicDocsView`] wrap them and swap the permission for
//! [`permission::AllowAny`], so the gateway serves them without ever
//! consulting the authentication backend.
//!
//! Middleware order (outermost -> innermost):
//! set request id -> propagate request id -> trace -> push request id to extensions
//! -> timeout -> body limit -> auth -> router

pub mod auth;
pub mod config;
pub mod gateway;
pub mod middleware;
pub mod negotiation;
pub mod permission;
pub mod problem;
pub mod views;
mod web;

pub use config::ApiDocsConfig;
pub use gateway::ApiDocsGateway;
pub use problem::Problem;
