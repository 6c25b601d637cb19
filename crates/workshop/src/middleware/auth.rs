//! Authentication extractors.
//!
//! All of them read the session placed in the request extensions by the
//! `SessionManagerLayer`. The role checked here is the one cached in the
//! session at sign-in.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::session::keys;
use crate::models::{CurrentUser, Viewer};
use crate::services::anonymous;

/// Extractor that requires a signed-in admin.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdmin(pub CurrentUser);

/// Extractor that optionally gets the signed-in user. A session that cannot
/// be loaded counts as signed out.
pub struct OptionalUser(pub Option<CurrentUser>);

/// The request's viewer: the signed-in user, or the anonymous session id if
/// one has already been issued. Never issues a new id.
pub struct ViewerContext(pub Viewer);

/// Why an authenticated extractor refused a request.
#[derive(Debug)]
pub enum AuthRejection {
    /// No session layer in front of the handler.
    MissingSession,
    /// The session store could not load the visitor's session.
    SessionUnavailable,
    /// Nobody is signed in.
    Unauthorized,
    /// Signed in, but not an admin.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingSession | Self::SessionUnavailable => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable")
            }
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Sign in required"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Admin access required"),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn session(parts: &Parts) -> Result<&Session, AuthRejection> {
    parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::MissingSession)
}

async fn session_user(parts: &Parts) -> Result<Option<CurrentUser>, AuthRejection> {
    session(parts)?
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to load session");
            AuthRejection::SessionUnavailable
        })
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = session_user(parts)
            .await?
            .ok_or(AuthRejection::Unauthorized)?;
        if !user.is_admin() {
            tracing::info!(user_id = %user.id, path = %parts.uri.path(), "Admin route refused");
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await.ok().flatten()))
    }
}

impl<S> FromRequestParts<S> for ViewerContext
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = session_user(parts).await? {
            return Ok(Self(Viewer::signed_in(user)));
        }
        let session_id = anonymous::current(session(parts)?).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to read anonymous session id");
            AuthRejection::SessionUnavailable
        })?;
        Ok(Self(Viewer {
            user: None,
            session_id,
        }))
    }
}
