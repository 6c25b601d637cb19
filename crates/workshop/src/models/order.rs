//! Children's orders and their ownership scoping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use santas_workshop_core::{OrderId, OrderStatus, Priority, SessionId, ToyId, UserId};

/// An order for a toy.
///
/// Exactly one of `user_id` and `session_id` is set on orders created by this
/// service; orders written by other tools may carry neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub child_name: String,
    pub country: String,
    pub toy_id: ToyId,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub session_id: Option<SessionId>,
}

impl Order {
    /// The owner tag, if the order has one.
    #[must_use]
    pub fn owner(&self) -> Option<OrderOwner> {
        match (&self.user_id, &self.session_id) {
            (Some(user), _) => Some(OrderOwner::User(user.clone())),
            (None, Some(session)) => Some(OrderOwner::Session(session.clone())),
            (None, None) => None,
        }
    }
}

/// Who an order belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOwner {
    /// A signed-in user.
    User(UserId),
    /// An anonymous visitor, identified by their session id.
    Session(SessionId),
}

/// Which orders a viewer may read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderScope {
    /// Every order (admins).
    All,
    /// Orders tagged with this user id.
    User(UserId),
    /// Orders tagged with this anonymous session id.
    Session(SessionId),
    /// No identity at all; resolved by the unscoped visibility policy.
    Unscoped,
}

/// Raw order form as submitted by a client, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderForm {
    pub child_name: String,
    pub country: String,
    pub toy_id: String,
    pub priority: Option<Priority>,
    pub status: Option<OrderStatus>,
}

/// Validated payload for creating an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub child_name: String,
    pub country: String,
    pub toy_id: ToyId,
    pub priority: Priority,
}

/// Partial order update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toy_id: Option<ToyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

/// Stored shape of a new order. Both owner fields are always written so that
/// the absent one is an explicit `null`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderFields {
    pub child_name: String,
    pub country: String,
    pub toy_id: ToyId,
    pub priority: Priority,
    pub status: OrderStatus,
    pub user_id: Option<UserId>,
    pub session_id: Option<SessionId>,
}

impl OrderFields {
    pub(crate) fn new(order: NewOrder, owner: OrderOwner) -> Self {
        let (user_id, session_id) = match owner {
            OrderOwner::User(id) => (Some(id), None),
            OrderOwner::Session(id) => (None, Some(id)),
        };
        Self {
            child_name: order.child_name,
            country: order.country,
            toy_id: order.toy_id,
            priority: order.priority,
            status: OrderStatus::Pending,
            user_id,
            session_id,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn new_order() -> NewOrder {
        NewOrder {
            child_name: "Mia".to_string(),
            country: "Norway".to_string(),
            toy_id: ToyId::new("t1"),
            priority: Priority::High,
        }
    }

    #[test]
    fn test_anonymous_fields_null_user() {
        let fields = OrderFields::new(new_order(), OrderOwner::Session(SessionId::new("anon_1")));
        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(value["userId"], json!(null));
        assert_eq!(value["sessionId"], json!("anon_1"));
        assert_eq!(value["status"], json!("Pending"));
    }

    #[test]
    fn test_owner_prefers_user() {
        let order: Order = serde_json::from_value(json!({
            "id": "o1",
            "childName": "Mia",
            "country": "Norway",
            "toyId": "t1",
            "userId": "u1",
            "sessionId": null
        }))
        .unwrap();
        assert_eq!(order.owner(), Some(OrderOwner::User(UserId::new("u1"))));
        assert_eq!(order.priority, Priority::Normal);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.created_at.is_none());
    }
}
