//! Identity provider seam.
//!
//! The gateway only needs "check these credentials" and "create this
//! account"; [`LocalIdentityProvider`] answers both from the `identities`
//! collection with Argon2id password hashes.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;

use santas_workshop_core::{Email, UserId};

use super::AuthError;
use crate::db::{DocumentStore, IdentityRepository};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Email/password identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Check credentials and return the user's id.
    async fn sign_in(&self, email: &Email, password: &str) -> Result<UserId, AuthError>;

    /// Create an account and return the new user's id.
    async fn sign_up(&self, email: &Email, password: &str) -> Result<UserId, AuthError>;
}

/// Identity provider backed by the document store.
pub struct LocalIdentityProvider {
    store: Arc<dyn DocumentStore>,
}

impl LocalIdentityProvider {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self, email: &Email, password: &str) -> Result<UserId, AuthError> {
        let identity = IdentityRepository::new(self.store.as_ref())
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &identity.password_hash)?;

        Ok(identity.id)
    }

    async fn sign_up(&self, email: &Email, password: &str) -> Result<UserId, AuthError> {
        validate_password(password)?;

        let identities = IdentityRepository::new(self.store.as_ref());
        if identities.find_by_email(email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let identity = identities.create(email, &password_hash).await?;
        Ok(identity.id)
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryDocumentStore;

    fn provider() -> LocalIdentityProvider {
        LocalIdentityProvider::new(Arc::new(MemoryDocumentStore::new()))
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("snowflake").unwrap();
        assert!(verify_password("snowflake", &hash).is_ok());
        assert!(matches!(
            verify_password("slush", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("12345"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("123456").is_ok());
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let provider = provider();
        let email = Email::parse("elf@workshop.org").unwrap();

        let id = provider.sign_up(&email, "candycane").await.unwrap();
        assert_eq!(provider.sign_in(&email, "candycane").await.unwrap(), id);
        assert!(matches!(
            provider.sign_in(&email, "gingerbread").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_sign_up() {
        let provider = provider();
        let email = Email::parse("elf@workshop.org").unwrap();
        provider.sign_up(&email, "candycane").await.unwrap();
        assert!(matches!(
            provider.sign_up(&email, "candycane").await,
            Err(AuthError::UserAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_unknown_email() {
        let provider = provider();
        let email = Email::parse("nobody@workshop.org").unwrap();
        assert!(matches!(
            provider.sign_in(&email, "whatever").await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
