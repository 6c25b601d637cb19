//! Authentication error types.

use thiserror::Error;

use crate::db::StoreError;
use crate::services::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] santas_workshop_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid email or password")]
    InvalidCredentials,

    /// User already exists.
    #[error("an account with this email already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Session storage error.
    #[error("session error: {0}")]
    Storage(#[from] StorageError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether the failure was caused by the caller's input rather than the
    /// service.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmail(_)
                | Self::InvalidCredentials
                | Self::UserAlreadyExists
                | Self::WeakPassword(_)
        )
    }
}
