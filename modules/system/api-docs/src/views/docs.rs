use async_trait::async_trait;
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use minijinja::{Environment, context};

use crate::permission::{IsAuthenticated, Permission};
use crate::problem::Problem;
use crate::views::{View, ViewError};

const TEMPLATE_NAME: &str = "swagger_ui.html";

/// Media type the page asks the schema view for.
const SCHEMA_MEDIA_TYPE: &str = "application/vnd.oai.openapi+json";

/// Serves a Swagger UI page that loads the schema from `schema_url`.
///
/// The UI assets come from `swagger_ui_dist`; only the bootstrap page is
/// rendered here. Requires an authenticated caller; see
/// [`super::PublicDocsView`] for the variant that admits everyone.
pub struct DocsView {
    title: String,
    schema_url: String,
    swagger_ui_dist: String,
    env: Environment<'static>,
    permission: IsAuthenticated,
}

impl DocsView {
    /// # Errors
    /// Returns [`ViewError::Template`] if the embedded template fails to parse.
    pub fn new(
        title: impl Into<String>,
        schema_url: impl Into<String>,
        swagger_ui_dist: impl Into<String>,
    ) -> Result<Self, ViewError> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, include_str!("templates/swagger_ui.html"))?;

        let swagger_ui_dist = swagger_ui_dist.into();
        Ok(Self {
            title: title.into(),
            schema_url: schema_url.into(),
            swagger_ui_dist: swagger_ui_dist.trim_end_matches('/').to_owned(),
            env,
            permission: IsAuthenticated,
        })
    }

    #[must_use]
    pub fn schema_url(&self) -> &str {
        &self.schema_url
    }

    /// Render the page.
    ///
    /// # Errors
    /// Returns the template engine error if rendering fails.
    pub fn render(&self) -> Result<String, minijinja::Error> {
        self.env.get_template(TEMPLATE_NAME)?.render(context! {
            title => &self.title,
            schema_url => &self.schema_url,
            schema_media_type => SCHEMA_MEDIA_TYPE,
            dist => &self.swagger_ui_dist,
        })
    }
}

#[async_trait]
impl View for DocsView {
    fn name(&self) -> &'static str {
        "docs"
    }

    fn permission(&self) -> &dyn Permission {
        &self.permission
    }

    async fn get(&self, parts: &Parts) -> Response {
        match self.render() {
            Ok(page) => {
                let mut response = Html(page).into_response();
                response
                    .headers_mut()
                    .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
                response
            }
            Err(e) => {
                tracing::error!("Failed to render docs page: {e}");
                Problem::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "Failed to render the API documentation",
                )
                .with_instance(parts.uri.path())
                .into_response()
            }
        }
    }
}
