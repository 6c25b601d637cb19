//! Elf roster route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use tracing::instrument;

use santas_workshop_core::{ElfId, EnergyBand};

use crate::{
    config::ElfBoostPolicy,
    db::ElfRepository,
    error::AppError,
    middleware::auth::{OptionalUser, RequireAdmin},
    models::{Elf, ElfForm, ElfPatch},
    services::cache::Snapshot,
    state::AppState,
};

/// Build the elf router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/elves", get(index).post(create))
        .route("/api/elves/refresh", post(refresh))
        .route("/api/elves/{id}", get(show).put(update).delete(destroy))
        .route("/api/elves/{id}/boost", post(boost))
}

/// An elf with its display energy band.
#[derive(Debug, Serialize)]
pub struct ElfView {
    #[serde(flatten)]
    pub elf: Elf,
    pub band: EnergyBand,
}

impl From<Elf> for ElfView {
    fn from(elf: Elf) -> Self {
        let band = elf.energy.band();
        Self { elf, band }
    }
}

/// Elf roster.
#[derive(Debug, Serialize)]
pub struct ElfListResponse {
    pub elves: Vec<ElfView>,
    pub loading: bool,
    pub error: Option<String>,
}

/// List every elf.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<ElfListResponse>, AppError> {
    let snapshot = state.cache().elves().await?;
    Ok(Json(snapshot.into()))
}

/// Reload elves from the store, then list them.
#[instrument(skip(state))]
pub async fn refresh(State(state): State<AppState>) -> Result<Json<ElfListResponse>, AppError> {
    let snapshot = state.cache().refresh_elves().await?;
    Ok(Json(snapshot.into()))
}

impl From<Snapshot<Elf>> for ElfListResponse {
    fn from(snapshot: Snapshot<Elf>) -> Self {
        Self {
            elves: snapshot.items.into_iter().map(ElfView::from).collect(),
            loading: snapshot.loading,
            error: snapshot.error,
        }
    }
}

/// Show one elf's profile.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ElfId>,
) -> Result<Json<ElfView>, AppError> {
    let elf = ElfRepository::new(state.store()).get_by_id(&id).await?;
    Ok(Json(elf.into()))
}

/// Add an elf to the roster.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(form): Json<ElfForm>,
) -> Result<(StatusCode, Json<ElfView>), AppError> {
    let new_elf = form.validate()?;
    let elf = ElfRepository::new(state.store()).create(new_elf).await?;
    state.cache().elves_changed().await;
    Ok((StatusCode::CREATED, Json(elf.into())))
}

/// Edit an elf. Energy is clamped into range by the repository.
#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ElfId>,
    Json(form): Json<ElfForm>,
) -> Result<Json<ElfView>, AppError> {
    let patch = ElfPatch::from(form.validate()?);
    let elf = ElfRepository::new(state.store()).update(&id, patch).await?;
    state.cache().elves_changed().await;
    Ok(Json(elf.into()))
}

/// Remove an elf.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn destroy(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ElfId>,
) -> Result<StatusCode, AppError> {
    ElfRepository::new(state.store()).delete(&id).await?;
    state.cache().elves_changed().await;
    Ok(StatusCode::NO_CONTENT)
}

/// Give an elf a +10 energy boost.
///
/// With the `persist` boost policy the boost is written and requires an
/// admin; with `preview` the boosted elf is returned without being stored.
#[instrument(skip(state, user))]
pub async fn boost(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(id): Path<ElfId>,
) -> Result<Json<ElfView>, AppError> {
    let policy = state.config().elf_boost;
    if policy == ElfBoostPolicy::Persist {
        match &user {
            None => return Err(AppError::Unauthorized("sign in to boost elves".to_string())),
            Some(user) if !user.is_admin() => {
                return Err(AppError::Forbidden("only admins can boost elves".to_string()));
            }
            Some(_) => {}
        }
    }

    let elf = ElfRepository::new(state.store())
        .boost_energy(&id, policy)
        .await?;
    if policy == ElfBoostPolicy::Persist {
        state.cache().elves_changed().await;
    }
    Ok(Json(elf.into()))
}
