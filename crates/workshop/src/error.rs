//! Unified error handling for the console.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;
use crate::services::auth::AuthError;
use crate::services::storage::StorageError;
use crate::validation::ValidationError;

/// Application-level error type for the console.
#[derive(Debug, Error)]
pub enum AppError {
    /// Record store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A submitted form failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Authentication infrastructure failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session storage failed.
    #[error("Session error: {0}")]
    Session(#[from] StorageError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::NotFound { .. }) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::PermissionDenied(_)) | Self::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            Self::Store(StoreError::Fetch { .. } | StoreError::Write { .. }) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Auth(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Store(StoreError::DataCorruption { .. })
            | Self::Auth(_)
            | Self::Session(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Console request error"
            );
        }

        if let Self::Validation(e) = self {
            return (status, Json(e)).into_response();
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(StoreError::Fetch { .. } | StoreError::Write { .. }) => {
                "Record store unavailable".to_string()
            }
            _ if status.is_server_error() => "Internal server error".to_string(),
            Self::Auth(e) => e.to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Set the Sentry user context for the signed-in user.
pub fn set_sentry_user(user_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
