use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::Query;
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use utoipa::openapi::OpenApi;

use crate::negotiation;
use crate::permission::{IsAuthenticated, Permission};
use crate::problem::Problem;
use crate::views::View;

/// Serialization of the served document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Yaml,
    Json,
}

impl SchemaFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    /// Value accepted by the `format` query parameter.
    fn from_query(value: &str) -> Option<(&'static str, Self)> {
        OFFERS
            .iter()
            .copied()
            .find(|(_, f)| f.extension() == value)
    }
}

/// Media types offered, in order of preference when the client has none.
const OFFERS: [(&str, SchemaFormat); 4] = [
    ("application/vnd.oai.openapi", SchemaFormat::Yaml),
    ("application/yaml", SchemaFormat::Yaml),
    ("application/vnd.oai.openapi+json", SchemaFormat::Json),
    ("application/json", SchemaFormat::Json),
];

#[derive(Debug, Default, Deserialize)]
struct SchemaQuery {
    format: Option<String>,
}

/// Serves the `OpenAPI` document, YAML or JSON by content negotiation.
///
/// Requires an authenticated caller; see [`super::PublicSchemaView`] for the
/// variant that admits everyone.
pub struct SchemaView {
    document: Arc<OpenApi>,
    permission: IsAuthenticated,
}

impl SchemaView {
    #[must_use]
    pub fn new(document: Arc<OpenApi>) -> Self {
        Self {
            document,
            permission: IsAuthenticated,
        }
    }

    #[must_use]
    pub fn document(&self) -> &OpenApi {
        &self.document
    }

    /// Choose media type and format for the request.
    ///
    /// A `format` query parameter overrides the `Accept` header.
    fn negotiate(parts: &Parts) -> Result<(&'static str, SchemaFormat), Box<Problem>> {
        let query = Query::<SchemaQuery>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();

        if let Some(format) = query.format.as_deref() {
            return SchemaFormat::from_query(format).ok_or_else(|| {
                Box::new(Problem::new(
                    StatusCode::NOT_FOUND,
                    "Not Found",
                    format!("Unknown schema format '{format}'. Available formats: yaml, json"),
                ))
            });
        }

        let accept = parts
            .headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok());
        let media_types: Vec<&str> = OFFERS.iter().map(|(m, _)| *m).collect();
        negotiation::select(accept, &media_types)
            .map(|idx| OFFERS[idx])
            .ok_or_else(|| {
                Box::new(Problem::new(
                    StatusCode::NOT_ACCEPTABLE,
                    "Not Acceptable",
                    format!(
                        "Could not satisfy the request Accept header. Available media types: {}",
                        media_types.join(", ")
                    ),
                ))
            })
    }

    fn render(&self, format: SchemaFormat) -> Result<String, String> {
        match format {
            SchemaFormat::Json => {
                serde_json::to_string_pretty(self.document.as_ref()).map_err(|e| e.to_string())
            }
            SchemaFormat::Yaml => self.document.to_yaml().map_err(|e| e.to_string()),
        }
    }

    fn filename(&self, format: SchemaFormat) -> String {
        let slug = slugify(&self.document.info.title);
        let stem = if slug.is_empty() { "schema" } else { &slug };
        format!("{stem}.{}", format.extension())
    }
}

#[async_trait]
impl View for SchemaView {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn permission(&self) -> &dyn Permission {
        &self.permission
    }

    async fn get(&self, parts: &Parts) -> Response {
        let (media_type, format) = match Self::negotiate(parts) {
            Ok(chosen) => chosen,
            Err(problem) => return problem.with_instance(parts.uri.path()).into_response(),
        };

        let body = match self.render(format) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(format = format.extension(), "Failed to serialize OpenAPI doc: {e}");
                return Problem::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "Failed to render the API schema",
                )
                .with_instance(parts.uri.path())
                .into_response();
            }
        };

        let content_type = format!("{media_type}; charset=utf-8");
        let disposition = format!("inline; filename=\"{}\"", self.filename(format));
        let headers = [
            (header::CONTENT_TYPE, HeaderValue::from_str(&content_type)),
            (header::CONTENT_DISPOSITION, HeaderValue::from_str(&disposition)),
        ];
        let mut response = (StatusCode::OK, body).into_response();
        for (name, value) in headers {
            match value {
                Ok(value) => {
                    response.headers_mut().insert(name, value);
                }
                Err(e) => tracing::warn!(header = %name, "Skipping invalid header value: {e}"),
            }
        }
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response
            .headers_mut()
            .insert(header::VARY, HeaderValue::from_static("Accept"));
        response
    }
}

/// Lowercase ASCII alphanumerics joined by single dashes.
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
