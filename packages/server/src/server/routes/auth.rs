use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::common::AppError;
use crate::domains::auth::{RefreshInput, SignInInput, SignUpInput};
use crate::server::app::AxumAppState;
use crate::server::error::success;
use crate::server::middleware::AuthUser;

/// POST /api/auth/signup
pub async fn sign_up_handler(
    Extension(state): Extension<AxumAppState>,
    Json(input): Json<SignUpInput>,
) -> Result<Response, AppError> {
    let session = state.auth.sign_up(input).await?;
    Ok(success(StatusCode::CREATED, session))
}

/// POST /api/auth/signin
pub async fn sign_in_handler(
    Extension(state): Extension<AxumAppState>,
    Json(input): Json<SignInInput>,
) -> Result<Response, AppError> {
    let session = state.auth.sign_in(input).await?;
    Ok(success(StatusCode::OK, session))
}

/// POST /api/auth/refresh
pub async fn refresh_handler(
    Extension(state): Extension<AxumAppState>,
    Json(input): Json<RefreshInput>,
) -> Result<Response, AppError> {
    let grant = state.auth.refresh(input)?;
    Ok(success(StatusCode::OK, grant))
}

/// GET /api/auth/me
pub async fn me_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
) -> Result<Response, AppError> {
    let profile = state.auth.identity(user.user_id).await?;
    Ok(success(StatusCode::OK, json!({ "user": profile })))
}
