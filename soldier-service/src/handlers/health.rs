use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::time::Duration;

const DB_PING_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Readiness probe: the backend must answer the ping within one second; a
/// timeout is treated identically to a connectivity failure.
pub async fn db_health_check(State(state): State<AppState>) -> impl IntoResponse {
    match tokio::time::timeout(DB_PING_TIMEOUT, state.db.ping()).await {
        Ok(Ok(())) => (StatusCode::OK, Json(json!({ "status": "connected" }))),
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not connected" })),
        ),
    }
}
