//! Dashboard and countdown route handlers.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::instrument;

use crate::{
    error::AppError,
    middleware::auth::ViewerContext,
    services::{
        Countdown,
        query::{DashboardStats, NOTICES},
    },
    state::AppState,
};

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard", get(index))
        .route("/api/countdown", get(countdown))
}

/// Dashboard summary for the viewer.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub notices: &'static [&'static str],
    pub countdown: Countdown,
}

/// Summary counts, notices and the Christmas countdown.
///
/// Order counts cover only the orders the viewer can see.
#[instrument(skip(state, viewer))]
pub async fn index(
    State(state): State<AppState>,
    ViewerContext(viewer): ViewerContext,
) -> Result<Json<DashboardResponse>, AppError> {
    let cache = state.cache();
    let scope = viewer.order_scope();
    let (toys, orders, elves) = tokio::try_join!(cache.toys(), cache.orders(&scope), cache.elves())?;

    Ok(Json(DashboardResponse {
        stats: DashboardStats::compute(&toys.items, &orders.items, &elves.items),
        notices: &NOTICES,
        countdown: Countdown::now(),
    }))
}

/// Time left until Christmas.
pub async fn countdown() -> Json<Countdown> {
    Json(Countdown::now())
}
