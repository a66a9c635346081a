//! Demo host API documented by the gateway.

use axum::{Extension, Json, Router, extract::Path, http::StatusCode, routing::get};
use docs_security::SecurityContext;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Book {
    pub id: u32,
    pub title: String,
    pub author: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WhoAmI {
    pub subject_id: Uuid,
    pub subject_tenant_id: Uuid,
    pub token_scopes: Vec<String>,
}

fn catalog() -> [Book; 2] {
    [
        Book {
            id: 1,
            title: "Dune".to_owned(),
            author: "Frank Herbert".to_owned(),
        },
        Book {
            id: 2,
            title: "Solaris".to_owned(),
            author: "Stanislaw Lem".to_owned(),
        },
    ]
}

/// List all books.
#[utoipa::path(
    get,
    path = "/api/v1/books",
    tag = "books",
    responses((status = 200, description = "All books", body = [Book])),
    security(("bearerAuth" = []))
)]
async fn list_books() -> Json<Vec<Book>> {
    Json(catalog().into())
}

/// Get a book by id.
#[utoipa::path(
    get,
    path = "/api/v1/books/{id}",
    tag = "books",
    params(("id" = u32, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 404, description = "No such book")
    ),
    security(("bearerAuth" = []))
)]
async fn get_book(Path(id): Path<u32>) -> Result<Json<Book>, StatusCode> {
    catalog()
        .into_iter()
        .find(|b| b.id == id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Identity the gateway resolved for the caller.
#[utoipa::path(
    get,
    path = "/api/v1/whoami",
    tag = "identity",
    responses((status = 200, description = "Caller identity", body = WhoAmI)),
    security(("bearerAuth" = []))
)]
async fn whoami(Extension(ctx): Extension<SecurityContext>) -> Json<WhoAmI> {
    Json(WhoAmI {
        subject_id: ctx.subject_id(),
        subject_tenant_id: ctx.subject_tenant_id(),
        token_scopes: ctx.token_scopes().to_vec(),
    })
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Library API", description = "Demo API served with public docs"),
    paths(list_books, get_book, whoami),
    components(schemas(Book, WhoAmI))
)]
pub struct LibraryApi;

pub fn router() -> Router {
    Router::new()
        .route("/api/v1/books", get(list_books))
        .route("/api/v1/books/{id}", get(get_book))
        .route("/api/v1/whoami", get(whoami))
}
