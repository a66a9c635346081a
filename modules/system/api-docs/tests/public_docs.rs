#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The public schema and docs views are served to every caller, and the
//! authentication backend is never consulted for them.

mod common;

use api_docs::ApiDocsConfig;
use axum::{
    body::Body,
    http::{StatusCode, header},
};
use common::{VALID_TOKEN, app, body_string, get_with_auth, request, send};
use utoipa::openapi::OpenApi;

const SCHEMA: &str = "/api/schema/";
const DOCS: &str = "/api/docs/";

#[tokio::test]
async fn anonymous_schema_request_returns_openapi_document() {
    let (router, authn) = app(ApiDocsConfig::default());

    let response = send(&router, request(SCHEMA).body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/vnd.oai.openapi; charset=utf-8"
    );

    let body = body_string(response).await;
    let doc: serde_json::Value = serde_saphyr::from_str(&body).unwrap();
    assert_eq!(doc["info"]["title"], "Library API");
    assert!(doc["paths"]["/api/v1/books"]["get"].is_object());
    assert_eq!(
        doc["components"]["securitySchemes"]["bearerAuth"]["scheme"],
        "bearer"
    );
    assert_eq!(authn.calls(), 0);
}

#[tokio::test]
async fn anonymous_schema_request_can_ask_for_json() {
    let (router, _authn) = app(ApiDocsConfig::default());

    let response = send(
        &router,
        request(SCHEMA)
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc: OpenApi = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(doc.info.version, "1.0.0");
}

#[tokio::test]
async fn anonymous_docs_request_returns_html() {
    let (router, authn) = app(ApiDocsConfig::default());

    let response = send(&router, request(DOCS).body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );

    let body = body_string(response).await;
    assert!(body.contains("<html"));
    assert!(body.contains("SwaggerUIBundle"));
    assert!(body.contains("<title>Library API</title>"));
    assert_eq!(authn.calls(), 0);
}

#[tokio::test]
async fn anonymous_head_requests_are_served() {
    let (router, authn) = app(ApiDocsConfig::default());

    for path in [SCHEMA, DOCS] {
        let get = send(&router, request(path).body(Body::empty()).unwrap()).await;
        let head = send(
            &router,
            request(path).method("HEAD").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(head.status(), StatusCode::OK, "{path}");
        assert_eq!(
            head.headers().get(header::CONTENT_TYPE),
            get.headers().get(header::CONTENT_TYPE),
            "{path}"
        );
        assert!(body_string(head).await.is_empty(), "{path}");
    }
    assert_eq!(authn.calls(), 0);
}

#[tokio::test]
async fn valid_credentials_get_the_same_response() {
    let (router, _authn) = app(ApiDocsConfig::default());
    let bearer = format!("Bearer {VALID_TOKEN}");

    for path in [SCHEMA, DOCS] {
        let anonymous = send(&router, request(path).body(Body::empty()).unwrap()).await;
        let authenticated = send(&router, get_with_auth(path, &bearer)).await;

        assert_eq!(anonymous.status(), authenticated.status(), "{path}");
        assert_eq!(
            anonymous.headers().get(header::CONTENT_TYPE),
            authenticated.headers().get(header::CONTENT_TYPE),
            "{path}"
        );
        assert_eq!(
            body_string(anonymous).await,
            body_string(authenticated).await,
            "{path}"
        );
    }
}

#[tokio::test]
async fn invalid_credentials_are_ignored() {
    let (router, authn) = app(ApiDocsConfig::default());

    for path in [SCHEMA, DOCS] {
        for authorization in [
            "Bearer garbage",
            "Bearer ",
            "Basic Zm9vOmJhcg==",
            "definitely not a credential",
        ] {
            let response = send(&router, get_with_auth(path, authorization)).await;
            assert_eq!(
                response.status(),
                StatusCode::OK,
                "{path} with '{authorization}'"
            );
        }
    }

    assert_eq!(authn.calls(), 0, "public views must not consult AuthN");
}

#[tokio::test]
async fn negotiation_errors_pass_through_unchanged() {
    let (router, _authn) = app(ApiDocsConfig::default());

    let response = send(
        &router,
        request("/api/schema/?format=xml").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &router,
        request(SCHEMA)
            .header(header::ACCEPT, "image/png")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
}

#[tokio::test]
async fn host_routes_still_require_authentication() {
    let (router, authn) = app(ApiDocsConfig::default());

    let response = send(
        &router,
        request("/api/v1/books").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&router, get_with_auth("/api/v1/books", "Bearer garbage")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &router,
        get_with_auth("/api/v1/books", &format!("Bearer {VALID_TOKEN}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["subject_id"], common::READER_SUBJECT_ID.to_string());

    assert_eq!(authn.calls(), 2);
}

#[tokio::test]
async fn custom_mount_paths_are_public() {
    let mut config = ApiDocsConfig::default();
    config.docs.schema_path = "/openapi.yaml".to_owned();
    config.docs.docs_path = "/docs".to_owned();
    let (router, _authn) = app(config);

    let response = send(&router, request("/openapi.yaml").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&router, request("/docs").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("openapi.yaml"));

    // Unmounted default path falls under require_auth_by_default
    let response = send(&router, request(SCHEMA).body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn disabled_docs_are_not_mounted() {
    let config = ApiDocsConfig {
        enable_docs: false,
        ..ApiDocsConfig::default()
    };
    let (router, _authn) = app(config);

    let response = send(
        &router,
        get_with_auth(SCHEMA, &format!("Bearer {VALID_TOKEN}")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
