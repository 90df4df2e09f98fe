//! Router assembly.

use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware, Extension, Json, Router};
use serde_json::json;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::auth::AuthService;
use crate::domains::contacts::ContactService;
use crate::kernel::ServerDeps;
use crate::server::middleware::{
    extract_client_ip, jwt_auth_middleware, signin_rate_limit, SigninRateLimiter,
};
use crate::server::routes::{
    create_contact_handler, delete_contact_handler, get_contact_handler, health_handler,
    list_contacts_handler, list_logs_handler, me_handler, refresh_handler, sign_in_handler,
    sign_up_handler, update_contact_handler,
};

/// Shared state available to every handler via `Extension`.
#[derive(Clone)]
pub struct AxumAppState {
    pub auth: Arc<AuthService>,
    pub contacts: Arc<ContactService>,
    /// Absent when running on the in-memory store.
    pub db_pool: Option<PgPool>,
}

/// Build the Axum application router
///
/// Wires the services over whatever stores `deps` carries, so the same
/// router serves production (Postgres) and tests (in-memory).
pub fn build_app(
    deps: Arc<ServerDeps>,
    db_pool: Option<PgPool>,
    signin_limiter: Arc<SigninRateLimiter>,
) -> Router {
    let auth = Arc::new(AuthService::new(
        deps.credentials.clone(),
        deps.tokens.clone(),
        deps.bcrypt_cost,
    ));
    let contacts = Arc::new(ContactService::new(
        deps.contacts.clone(),
        deps.activity.clone(),
    ));

    let app_state = AxumAppState {
        auth,
        contacts,
        db_pool,
    };

    // CORS configuration - allow any origin for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Clone token service for the middleware closure
    let tokens_for_middleware = deps.tokens.clone();

    Router::new()
        .route("/api/auth/signup", post(sign_up_handler))
        .route(
            "/api/auth/signin",
            // Only sign-in is throttled; the limiter keys on the IP placed
            // in extensions by extract_client_ip.
            post(sign_in_handler).layer(middleware::from_fn(move |req, next| {
                signin_rate_limit(signin_limiter.clone(), req, next)
            })),
        )
        .route("/api/auth/refresh", post(refresh_handler))
        .route("/api/auth/me", get(me_handler))
        .route(
            "/api/contacts",
            get(list_contacts_handler).post(create_contact_handler),
        )
        .route("/api/contacts/logs", get(list_logs_handler))
        .route(
            "/api/contacts/:id",
            get(get_contact_handler)
                .put(update_contact_handler)
                .delete(delete_contact_handler),
        )
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(tokens_for_middleware.clone(), req, next)
        }))
        .layer(middleware::from_fn(extract_client_ip))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Not found",
        })),
    )
}
