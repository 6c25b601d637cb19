//! Authentication route handlers.
//!
//! Email/password sign-in, registration and sign-out through the auth
//! gateway. Failures are reported in the `AuthOutcome` body.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use santas_workshop_core::SessionId;

use crate::{
    error::{AppError, clear_sentry_user, set_sentry_user},
    models::CurrentUser,
    services::auth::{AuthOutcome, AuthState},
    state::AppState,
};

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Email and password.
#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Authentication state of the caller.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub auth: AuthState,
    pub user: Option<CurrentUser>,
    pub is_admin: bool,
    pub session_id: Option<SessionId>,
}

fn outcome_status(outcome: &AuthOutcome, failure: StatusCode) -> StatusCode {
    if outcome.success { StatusCode::OK } else { failure }
}

// =============================================================================
// Handlers
// =============================================================================

/// Sign in.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<AuthOutcome>), AppError> {
    let mut auth = state.auth().session(&session).await?;
    let outcome = auth.login(&credentials.email, &credentials.password).await;
    if let Some(user) = auth.current_user() {
        set_sentry_user(user.id.as_str(), Some(user.email.as_str()));
    }
    Ok((outcome_status(&outcome, StatusCode::UNAUTHORIZED), Json(outcome)))
}

/// Create an account and sign in as it.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<AuthOutcome>), AppError> {
    let mut auth = state.auth().session(&session).await?;
    let outcome = auth
        .register(&credentials.email, &credentials.password)
        .await;
    if let Some(user) = auth.current_user() {
        set_sentry_user(user.id.as_str(), Some(user.email.as_str()));
    }
    Ok((outcome_status(&outcome, StatusCode::BAD_REQUEST), Json(outcome)))
}

/// Sign out.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<AuthOutcome>), AppError> {
    let mut auth = state.auth().session(&session).await?;
    let outcome = auth.logout().await;
    clear_sentry_user();
    Ok((
        outcome_status(&outcome, StatusCode::INTERNAL_SERVER_ERROR),
        Json(outcome),
    ))
}

/// Who the caller is.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn me(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<MeResponse>, AppError> {
    let auth = state.auth().session(&session).await?;
    let viewer = auth.viewer().await?;
    Ok(Json(MeResponse {
        auth: auth.state(),
        is_admin: auth.is_admin(),
        user: viewer.user,
        session_id: viewer.session_id,
    }))
}
