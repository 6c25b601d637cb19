//! Toy catalogue route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use tracing::instrument;

use santas_workshop_core::ToyId;

use crate::{
    db::ToyRepository,
    error::AppError,
    middleware::auth::RequireAdmin,
    models::{Toy, ToyForm, ToyPatch},
    services::{
        cache::Snapshot,
        query::{self, ToyQuery},
    },
    state::AppState,
};

/// Build the toy router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/toys", get(index).post(create))
        .route("/api/toys/refresh", post(refresh))
        .route("/api/toys/{id}", get(show).put(update).delete(destroy))
        .route("/api/toys/{id}/toggle-stock", post(toggle_stock))
}

/// Toy list with the category choices for the filter.
#[derive(Debug, Serialize)]
pub struct ToyListResponse {
    pub toys: Vec<Toy>,
    pub categories: Vec<String>,
    pub loading: bool,
    pub error: Option<String>,
}

/// List toys, filtered and sorted.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ToyQuery>,
) -> Result<Json<ToyListResponse>, AppError> {
    let snapshot = state.cache().toys().await?;
    Ok(Json(list_response(snapshot, &query)))
}

/// Reload toys from the store, then list them.
#[instrument(skip(state))]
pub async fn refresh(
    State(state): State<AppState>,
    Query(query): Query<ToyQuery>,
) -> Result<Json<ToyListResponse>, AppError> {
    let snapshot = state.cache().refresh_toys().await?;
    Ok(Json(list_response(snapshot, &query)))
}

fn list_response(snapshot: Snapshot<Toy>, query: &ToyQuery) -> ToyListResponse {
    let categories = query::categories(&snapshot.items);
    ToyListResponse {
        toys: query.apply(snapshot.items),
        categories,
        loading: snapshot.loading,
        error: snapshot.error,
    }
}

/// Show one toy.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ToyId>,
) -> Result<Json<Toy>, AppError> {
    let toy = ToyRepository::new(state.store()).get_by_id(&id).await?;
    Ok(Json(toy))
}

/// Add a toy to the catalogue.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<ToyForm>,
) -> Result<(StatusCode, Json<Toy>), AppError> {
    let new_toy = form.validate()?;
    let toy = ToyRepository::new(state.store()).create(new_toy).await?;
    state.cache().toys_changed().await;
    Ok((StatusCode::CREATED, Json(toy)))
}

/// Edit a toy.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ToyId>,
    Json(form): Json<ToyForm>,
) -> Result<Json<Toy>, AppError> {
    let patch = ToyPatch::from(form.validate()?);
    let toy = ToyRepository::new(state.store()).update(&id, patch).await?;
    state.cache().toys_changed().await;
    Ok(Json(toy))
}

/// Remove a toy.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ToyId>,
) -> Result<StatusCode, AppError> {
    ToyRepository::new(state.store()).delete(&id).await?;
    state.cache().toys_changed().await;
    Ok(StatusCode::NO_CONTENT)
}

/// Flip a toy between in stock and out of stock.
#[instrument(skip(state))]
pub async fn toggle_stock(
    State(state): State<AppState>,
    Path(id): Path<ToyId>,
) -> Result<Json<Toy>, AppError> {
    let toy = ToyRepository::new(state.store()).toggle_stock(&id).await?;
    state.cache().toys_changed().await;
    Ok(Json(toy))
}
