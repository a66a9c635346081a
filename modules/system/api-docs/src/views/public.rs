//! Public variants of the schema and docs views.
//!
//! Each adapter delegates everything to the view it wraps except the
//! permission, which is [`AllowAny`]. Because `AllowAny` does not require
//! authentication, the gateway treats their paths as public routes and never
//! consults the authentication backend for them.

use async_trait::async_trait;
use axum::http::request::Parts;
use axum::response::Response;

use crate::permission::{AllowAny, Permission};
use crate::views::{DocsView, SchemaView, View};

/// [`SchemaView`] reachable without authentication.
pub struct PublicSchemaView(SchemaView);

impl PublicSchemaView {
    #[must_use]
    pub fn new(inner: SchemaView) -> Self {
        Self(inner)
    }

    #[must_use]
    pub fn inner(&self) -> &SchemaView {
        &self.0
    }
}

#[async_trait]
impl View for PublicSchemaView {
    fn name(&self) -> &'static str {
        "public_schema"
    }

    fn permission(&self) -> &dyn Permission {
        &AllowAny
    }

    async fn get(&self, parts: &Parts) -> Response {
        self.0.get(parts).await
    }
}

/// [`DocsView`] reachable without authentication.
pub struct PublicDocsView(DocsView);

impl PublicDocsView {
    #[must_use]
    pub fn new(inner: DocsView) -> Self {
        Self(inner)
    }

    #[must_use]
    pub fn inner(&self) -> &DocsView {
        &self.0
    }
}

#[async_trait]
impl View for PublicDocsView {
    fn name(&self) -> &'static str {
        "public_docs"
    }

    fn permission(&self) -> &dyn Permission {
        &AllowAny
    }

    async fn get(&self, parts: &Parts) -> Response {
        self.0.get(parts).await
    }
}
