//! Auth/session gateway.
//!
//! Wraps the identity provider, derives the user's role from their role
//! record, and keeps the signed-in identity in the visitor's transient
//! storage. Every sign-in, registration and sign-out is published on a
//! broadcast channel so other components (the data cache) can react.

mod error;
mod provider;

pub use error::AuthError;
pub use provider::{IdentityProvider, LocalIdentityProvider, MIN_PASSWORD_LENGTH};

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::instrument;

use santas_workshop_core::{Email, SessionId, UserId, UserRole};

use crate::db::{DocumentStore, RoleRepository};
use crate::models::session::keys;
use crate::models::{CurrentUser, OrderScope, Viewer};
use crate::services::anonymous;
use crate::services::storage::{self, TransientStorage};

const EVENT_CAPACITY: usize = 64;

/// Authentication state of one visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "role", rename_all = "snake_case")]
pub enum AuthState {
    /// Nobody is signed in.
    Anonymous,
    /// Credentials are being checked and the role resolved.
    Authenticating,
    /// Signed in with the given role.
    Authenticated(UserRole),
}

/// Result of a login, registration or logout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthOutcome {
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: &AuthError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// A change of the current identity in some visitor's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    /// A visitor signed in (or registered and was signed in).
    SignedIn {
        user_id: UserId,
        role: UserRole,
        /// Anonymous session id the visitor held before signing in.
        previous_session: Option<SessionId>,
    },
    /// A visitor signed out.
    SignedOut { user_id: UserId },
}

impl IdentityEvent {
    /// Order scope of the identity after the change, if it has one.
    #[must_use]
    pub fn scope(&self) -> Option<OrderScope> {
        match self {
            Self::SignedIn {
                role: UserRole::Admin,
                ..
            } => Some(OrderScope::All),
            Self::SignedIn { user_id, .. } => Some(OrderScope::User(user_id.clone())),
            Self::SignedOut { .. } => None,
        }
    }
}

/// Shared entry point for authentication.
pub struct AuthGateway {
    store: Arc<dyn DocumentStore>,
    provider: Arc<dyn IdentityProvider>,
    events: broadcast::Sender<IdentityEvent>,
}

impl AuthGateway {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, provider: Arc<dyn IdentityProvider>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            provider,
            events,
        }
    }

    /// Subscribe to identity changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<IdentityEvent> {
        self.events.subscribe()
    }

    /// Load the authentication state held in `storage`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the storage cannot be read.
    pub async fn session<'a, S>(&'a self, storage: &'a S) -> Result<AuthSession<'a, S>, AuthError>
    where
        S: TransientStorage + ?Sized,
    {
        let user: Option<CurrentUser> = storage::get(storage, keys::CURRENT_USER).await?;
        let state = user
            .as_ref()
            .map_or(AuthState::Anonymous, |u| AuthState::Authenticated(u.role));
        Ok(AuthSession {
            gateway: self,
            storage,
            state,
            user,
        })
    }

    /// Look up a user's role, creating a `user` record if there is none.
    ///
    /// Lookup failures degrade to [`UserRole::User`].
    #[instrument(skip(self, email), fields(user_id = %user_id))]
    pub async fn resolve_role(&self, user_id: &UserId, email: Option<&Email>) -> UserRole {
        match RoleRepository::new(self.store.as_ref())
            .ensure(user_id, email)
            .await
        {
            Ok(record) => record.role,
            Err(e) => {
                tracing::warn!(error = %e, "Role lookup failed, defaulting to user");
                UserRole::User
            }
        }
    }

    fn publish(&self, event: IdentityEvent) {
        // No receivers is fine: nothing is caching per-identity data.
        let _ = self.events.send(event);
    }
}

/// One visitor's view of the gateway.
pub struct AuthSession<'a, S: ?Sized> {
    gateway: &'a AuthGateway,
    storage: &'a S,
    state: AuthState,
    user: Option<CurrentUser>,
}

impl<S> AuthSession<'_, S>
where
    S: TransientStorage + ?Sized,
{
    #[must_use]
    pub const fn state(&self) -> AuthState {
        self.state
    }

    #[must_use]
    pub const fn current_user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(UserRole::Admin))
    }

    /// The request's viewer: the signed-in user, or the anonymous session id
    /// if one has been issued.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the storage cannot be read.
    pub async fn viewer(&self) -> Result<Viewer, AuthError> {
        if let Some(user) = &self.user {
            return Ok(Viewer::signed_in(user.clone()));
        }
        Ok(Viewer {
            user: None,
            session_id: anonymous::current(self.storage).await?,
        })
    }

    /// Sign in with email and password.
    pub async fn login(&mut self, email: &str, password: &str) -> AuthOutcome {
        let previous = self.state;
        self.state = AuthState::Authenticating;
        let result = self.try_login(email, password).await;
        self.finish("login", previous, result)
    }

    /// Create an account and sign in as it.
    pub async fn register(&mut self, email: &str, password: &str) -> AuthOutcome {
        let previous = self.state;
        self.state = AuthState::Authenticating;
        let result = self.try_register(email, password).await;
        self.finish("register", previous, result)
    }

    /// Sign out. Signing out while anonymous succeeds.
    pub async fn logout(&mut self) -> AuthOutcome {
        match self.try_logout().await {
            Ok(()) => AuthOutcome::ok(),
            Err(e) => {
                tracing::error!(error = %e, "Logout failed");
                AuthOutcome::failed(&e)
            }
        }
    }

    fn finish(
        &mut self,
        action: &'static str,
        previous: AuthState,
        result: Result<(), AuthError>,
    ) -> AuthOutcome {
        match result {
            Ok(()) => AuthOutcome::ok(),
            Err(e) => {
                self.state = previous;
                if e.is_client_error() {
                    tracing::info!(action, error = %e, "Authentication rejected");
                } else {
                    tracing::error!(action, error = %e, "Authentication failed");
                }
                AuthOutcome::failed(&e)
            }
        }
    }

    async fn try_login(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        let user_id = self.gateway.provider.sign_in(&email, password).await?;
        let role = self.gateway.resolve_role(&user_id, Some(&email)).await;
        self.establish(CurrentUser {
            id: user_id,
            email,
            role,
        })
        .await
    }

    async fn try_register(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        let user_id = self.gateway.provider.sign_up(&email, password).await?;
        let record = RoleRepository::new(self.gateway.store.as_ref())
            .create(&user_id, UserRole::User, Some(&email))
            .await?;
        self.establish(CurrentUser {
            id: user_id,
            email,
            role: record.role,
        })
        .await
    }

    async fn establish(&mut self, user: CurrentUser) -> Result<(), AuthError> {
        self.storage.rotate().await?;
        let previous_session = anonymous::clear(self.storage).await?;
        storage::insert(self.storage, keys::CURRENT_USER, &user).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Signed in");
        self.gateway.publish(IdentityEvent::SignedIn {
            user_id: user.id.clone(),
            role: user.role,
            previous_session,
        });
        self.state = AuthState::Authenticated(user.role);
        self.user = Some(user);
        Ok(())
    }

    async fn try_logout(&mut self) -> Result<(), AuthError> {
        self.storage.remove_value(keys::CURRENT_USER).await?;
        self.storage.rotate().await?;
        if let Some(user) = self.user.take() {
            tracing::info!(user_id = %user.id, "Signed out");
            self.gateway
                .publish(IdentityEvent::SignedOut { user_id: user.id });
        }
        self.state = AuthState::Anonymous;
        Ok(())
    }
}
