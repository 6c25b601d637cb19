//! Role records and identity-provider credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use santas_workshop_core::{Email, UserId, UserRole};

/// Role record stored in the `users` collection under the user's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecord {
    pub id: UserId,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Email/password credential owned by the local identity provider.
///
/// Lives in the `identities` collection. The hash never leaves the provider.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub email: Email,
    pub password_hash: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_role_record_defaults_to_user() {
        let record: RoleRecord = serde_json::from_value(json!({ "id": "u1" })).unwrap();
        assert_eq!(record.role, UserRole::User);
        assert!(record.email.is_none());
    }

    #[test]
    fn test_identity_debug_redacts_hash() {
        let identity: Identity = serde_json::from_value(json!({
            "id": "u1",
            "email": "elf@workshop.org",
            "passwordHash": "$argon2id$secret"
        }))
        .unwrap();
        let debug = format!("{identity:?}");
        assert!(debug.contains("elf@workshop.org"));
        assert!(!debug.contains("$argon2id$secret"));
    }
}
