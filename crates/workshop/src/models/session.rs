//! Session-stored identity and the viewer context derived from it.

use serde::{Deserialize, Serialize};

use santas_workshop_core::{Email, SessionId, UserId, UserRole};

use super::order::{OrderOwner, OrderScope};

/// Session-stored identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
}

impl CurrentUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Who is making a request: a signed-in user, an anonymous visitor with a
/// session id, or nobody at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user: Option<CurrentUser>,
    pub session_id: Option<SessionId>,
}

impl Viewer {
    #[must_use]
    pub const fn anonymous(session_id: SessionId) -> Self {
        Self {
            user: None,
            session_id: Some(session_id),
        }
    }

    #[must_use]
    pub const fn signed_in(user: CurrentUser) -> Self {
        Self {
            user: Some(user),
            session_id: None,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }

    /// Which orders this viewer may read.
    #[must_use]
    pub fn order_scope(&self) -> OrderScope {
        if self.is_admin() {
            return OrderScope::All;
        }
        if let Some(user) = &self.user {
            return OrderScope::User(user.id.clone());
        }
        self.session_id
            .clone()
            .map_or(OrderScope::Unscoped, OrderScope::Session)
    }

    /// Owner tag for orders this viewer creates.
    #[must_use]
    pub fn order_owner(&self) -> Option<OrderOwner> {
        if let Some(user) = &self.user {
            return Some(OrderOwner::User(user.id.clone()));
        }
        self.session_id.clone().map(OrderOwner::Session)
    }
}

/// Session keys for identity and preference data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the anonymous visitor's session id.
    pub const ANONYMOUS_SESSION_ID: &str = "anonymous_session_id";

    /// Key for the theme preference.
    pub const THEME: &str = "theme";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: UserId::new("u1"),
            email: Email::parse("u1@workshop.org").unwrap(),
            role,
        }
    }

    #[test]
    fn test_order_scope_precedence() {
        assert_eq!(
            Viewer::signed_in(user(UserRole::Admin)).order_scope(),
            OrderScope::All
        );
        assert_eq!(
            Viewer::signed_in(user(UserRole::User)).order_scope(),
            OrderScope::User(UserId::new("u1"))
        );
        assert_eq!(
            Viewer::anonymous(SessionId::new("anon_123")).order_scope(),
            OrderScope::Session(SessionId::new("anon_123"))
        );
        assert_eq!(Viewer::default().order_scope(), OrderScope::Unscoped);
    }

    #[test]
    fn test_user_wins_over_session_for_ownership() {
        let viewer = Viewer {
            user: Some(user(UserRole::User)),
            session_id: Some(SessionId::new("anon_9")),
        };
        assert_eq!(
            viewer.order_owner(),
            Some(OrderOwner::User(UserId::new("u1")))
        );
        assert_eq!(Viewer::default().order_owner(), None);
    }
}
