//! Preferences API handlers.

use axum::{Json, Router, routing::{get, post}};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use santas_workshop_core::Theme;

use crate::{error::AppError, services::theme, state::AppState};

/// Build the preferences router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/preferences/theme", get(get_theme).post(set_theme))
        .route("/api/preferences/theme/toggle", post(toggle_theme))
}

/// Request for setting the theme.
#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

/// Current theme.
#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: Theme,
}

/// Get the visitor's theme.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn get_theme(session: Session) -> Result<Json<ThemeResponse>, AppError> {
    let theme = theme::get(&session).await?;
    Ok(Json(ThemeResponse { theme }))
}

/// Set the visitor's theme.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn set_theme(
    session: Session,
    Json(body): Json<ThemeRequest>,
) -> Result<Json<ThemeResponse>, AppError> {
    let theme = theme::set(&session, body.theme).await?;
    Ok(Json(ThemeResponse { theme }))
}

/// Switch between light and dark.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn toggle_theme(session: Session) -> Result<Json<ThemeResponse>, AppError> {
    let theme = theme::toggle(&session).await?;
    Ok(Json(ThemeResponse { theme }))
}
