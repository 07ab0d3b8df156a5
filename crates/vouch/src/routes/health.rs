//! Health check endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Basic health check (is the process running?)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct ReadyResponse {
    status: &'static str,
    redis: bool,
    database: bool,
}

/// Readiness check (are the cache and the store reachable?)
pub async fn ready_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadyResponse>) {
    let (redis, database) = state.ready().await;

    if redis && database {
        (
            StatusCode::OK,
            Json(ReadyResponse { status: "ready", redis, database }),
        )
    } else {
        tracing::warn!(redis, database, "Readiness check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse { status: "unavailable", redis, database }),
        )
    }
}
