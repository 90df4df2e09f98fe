use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::common::{AppError, ContactId, Page};
use crate::domains::contacts::models::{ContactInput, ContactPatch};
use crate::domains::contacts::ContactListQuery;
use crate::server::app::AxumAppState;
use crate::server::error::success;
use crate::server::middleware::AuthUser;

/// Listing query string. `page` stays a string here so garbage like
/// `?page=abc` falls back to the first page instead of rejecting the
/// request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    pub page: Option<String>,
}

/// GET /api/contacts
pub async fn list_contacts_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let page = state
        .contacts
        .list(
            user.user_id,
            ContactListQuery {
                page: parse_page(query.page.as_deref()),
                status: query.status,
                search: query.search,
            },
        )
        .await?;

    Ok(success(
        StatusCode::OK,
        json!({
            "contacts": page.items,
            "pagination": pagination_json(&page),
        }),
    ))
}

/// POST /api/contacts
pub async fn create_contact_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Json(input): Json<ContactInput>,
) -> Result<Response, AppError> {
    let contact = state.contacts.create(user.user_id, input).await?;
    Ok(success(StatusCode::CREATED, json!({ "contact": contact })))
}

/// GET /api/contacts/logs
pub async fn list_logs_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Query(query): Query<LogsQuery>,
) -> Result<Response, AppError> {
    let page = state
        .contacts
        .activity(user.user_id, parse_page(query.page.as_deref()))
        .await?;

    Ok(success(
        StatusCode::OK,
        json!({
            "logs": page.items,
            "pagination": pagination_json(&page),
        }),
    ))
}

/// GET /api/contacts/:id
pub async fn get_contact_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_contact_id(&id)?;
    let contact = state.contacts.get(user.user_id, id).await?;
    Ok(success(StatusCode::OK, json!({ "contact": contact })))
}

/// PUT /api/contacts/:id
pub async fn update_contact_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(patch): Json<ContactPatch>,
) -> Result<Response, AppError> {
    let id = parse_contact_id(&id)?;
    let contact = state.contacts.update(user.user_id, id, patch).await?;
    Ok(success(StatusCode::OK, json!({ "contact": contact })))
}

/// DELETE /api/contacts/:id
pub async fn delete_contact_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_contact_id(&id)?;
    state.contacts.delete(user.user_id, id).await?;
    Ok(success(StatusCode::OK, json!({})))
}

fn parse_contact_id(raw: &str) -> Result<ContactId, AppError> {
    ContactId::parse(raw).map_err(|_| AppError::validation("Invalid contact id"))
}

fn parse_page(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse().ok())
}

fn pagination_json<T>(page: &Page<T>) -> serde_json::Value {
    json!({
        "page": page.page,
        "limit": page.page_size,
        "total": page.total,
        "pages": page.total_pages,
    })
}
