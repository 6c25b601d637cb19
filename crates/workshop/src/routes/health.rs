//! Liveness and readiness checks.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Serialize;

use crate::{services::cache::CacheStatus, state::AppState};

/// Build the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
}

/// Readiness report.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub store: &'static str,
    pub cache: CacheStatus,
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Pings the record store; returns 503 Service Unavailable if it is not
/// reachable.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let (status, store) = match state.store().ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(error = %e, "Record store not reachable");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };
    let cache = state.cache().status().await;
    (status, Json(ReadinessResponse { store, cache }))
}
