use axum::{extract::Extension, http::StatusCode, Json};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::time::Duration;

use crate::server::app::AxumAppState;

const DB_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// GET /health
///
/// Probes the database with a bounded `SELECT 1` and reports pool usage.
/// A deployment wired to in-memory stores has no pool and counts as
/// healthy. 200 when everything answers, 503 otherwise.
pub async fn health_handler(
    Extension(state): Extension<AxumAppState>,
) -> (StatusCode, Json<Value>) {
    let probe = match &state.db_pool {
        Some(pool) => probe_database(pool).await,
        None => Ok(()),
    };

    let database = match &probe {
        Ok(()) => json!({ "status": "ok" }),
        Err(reason) => json!({ "status": "error", "error": reason }),
    };

    let mut body = json!({
        "status": if probe.is_ok() { "healthy" } else { "unhealthy" },
        "database": database,
    });
    if let Some(pool) = &state.db_pool {
        body["pool"] = json!({
            "connections": pool.size(),
            "idle": pool.num_idle(),
            "max": pool.options().get_max_connections(),
        });
    }

    let status = if probe.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

async fn probe_database(pool: &PgPool) -> Result<(), String> {
    match tokio::time::timeout(DB_PROBE_TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(err)) => Err(format!("query failed: {err}")),
        Err(_) => Err("query timed out".to_string()),
    }
}
