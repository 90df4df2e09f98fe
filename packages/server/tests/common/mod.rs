//! Common test utilities.
//!
//! Tests drive the real router over the in-memory store, so they exercise
//! routing, middleware, and services end to end without Postgres.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use server_core::domains::auth::TokenService;
use server_core::kernel::ServerDeps;
use server_core::server::build_app;
use server_core::server::middleware::SigninRateLimiter;

fn test_tokens() -> TokenService {
    TokenService::new("test_access_secret", "test_refresh_secret", 900, 604800)
}

/// A router over a fresh in-memory store, with a limiter high enough to
/// never interfere.
pub fn test_app() -> Router {
    test_app_with_limiter(10_000, 900)
}

pub fn test_app_with_limiter(limit: usize, window_secs: u64) -> Router {
    let deps = Arc::new(ServerDeps::in_memory(test_tokens(), 4));
    let limiter = Arc::new(SigninRateLimiter::new(
        limit,
        Duration::from_secs(window_secs),
    ));
    build_app(deps, None, limiter)
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn post_json_auth(
    app: &Router,
    uri: &str,
    token: &str,
    body: Value,
) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn put_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Signs up a user and returns (access_token, refresh_token).
pub async fn sign_up(app: &Router, email: &str, password: &str, name: &str) -> (String, String) {
    let response = post_json(
        app,
        "/api/auth/signup",
        serde_json::json!({ "email": email, "password": password, "name": name }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let access = body["data"]["accessToken"].as_str().unwrap().to_string();
    let refresh = body["data"]["refreshToken"].as_str().unwrap().to_string();
    (access, refresh)
}

/// Creates a contact and returns its id.
pub async fn create_contact(app: &Router, token: &str, name: &str, email: &str) -> String {
    let response = post_json_auth(
        app,
        "/api/contacts",
        token,
        serde_json::json!({ "name": name, "email": email }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    body["data"]["contact"]["id"].as_str().unwrap().to_string()
}
