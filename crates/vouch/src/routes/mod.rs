//! HTTP probes for orchestrators.

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod health;

/// Create the probe router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
