#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Caller identity shared by the authentication backend and the docs gateway.

pub mod constants;
pub mod context;

pub use context::SecurityContext;
