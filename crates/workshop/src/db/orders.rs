//! Order repository with per-viewer visibility.

use serde_json::Value;
use tracing::instrument;

use santas_workshop_core::OrderId;

use super::StoreError;
use super::document::{DocumentStore, decode_all, to_fields};
use crate::config::UnscopedOrderVisibility;
use crate::models::order::OrderFields;
use crate::models::{NewOrder, Order, OrderOwner, OrderPatch, OrderScope};

/// Repository for the `orders` collection.
pub struct OrderRepository<'a> {
    store: &'a dyn DocumentStore,
    unscoped: UnscopedOrderVisibility,
}

impl<'a> OrderRepository<'a> {
    pub const COLLECTION: &'static str = "orders";

    /// Create a new order repository using the default unscoped visibility.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            unscoped: UnscopedOrderVisibility::ShowAll,
        }
    }

    /// Use `policy` for viewers without any identity.
    #[must_use]
    pub const fn with_unscoped(mut self, policy: UnscopedOrderVisibility) -> Self {
        self.unscoped = policy;
        self
    }

    /// List the orders visible under `scope`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Fetch` if the store cannot be read.
    /// Returns `StoreError::DataCorruption` if a document is malformed.
    #[instrument(skip(self))]
    pub async fn get_all(&self, scope: &OrderScope) -> Result<Vec<Order>, StoreError> {
        let docs = match scope {
            OrderScope::All => self.store.list(Self::COLLECTION).await,
            OrderScope::User(user_id) => {
                self.store
                    .find_by(Self::COLLECTION, "userId", &Value::from(user_id.as_str()))
                    .await
            }
            OrderScope::Session(session_id) => {
                self.store
                    .find_by(
                        Self::COLLECTION,
                        "sessionId",
                        &Value::from(session_id.as_str()),
                    )
                    .await
            }
            OrderScope::Unscoped => match self.unscoped {
                UnscopedOrderVisibility::ShowAll => self.store.list(Self::COLLECTION).await,
                UnscopedOrderVisibility::Empty => Ok(Vec::new()),
            },
        }
        .map_err(StoreError::fetch(Self::COLLECTION))?;

        decode_all(docs, Self::COLLECTION)
    }

    /// Get an order by id, regardless of owner.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no order has this id.
    /// Returns `StoreError::Fetch` if the store cannot be read.
    pub async fn get_by_id(&self, id: &OrderId) -> Result<Order, StoreError> {
        self.store
            .get(Self::COLLECTION, id.as_str())
            .await
            .map_err(StoreError::fetch(Self::COLLECTION))?
            .ok_or_else(|| StoreError::not_found(Self::COLLECTION, id.as_str()))?
            .decode(Self::COLLECTION)
    }

    /// Get an order by id if it is visible under `scope`.
    ///
    /// Orders owned by someone else are reported as missing.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the order is absent or not visible.
    /// Returns `StoreError::Fetch` if the store cannot be read.
    pub async fn get_visible(&self, id: &OrderId, scope: &OrderScope) -> Result<Order, StoreError> {
        let order = self.get_by_id(id).await?;
        if self.is_visible(&order, scope) {
            Ok(order)
        } else {
            Err(StoreError::not_found(Self::COLLECTION, id.as_str()))
        }
    }

    fn is_visible(&self, order: &Order, scope: &OrderScope) -> bool {
        match scope {
            OrderScope::All => true,
            OrderScope::User(user_id) => order.user_id.as_ref() == Some(user_id),
            OrderScope::Session(session_id) => order.session_id.as_ref() == Some(session_id),
            OrderScope::Unscoped => self.unscoped == UnscopedOrderVisibility::ShowAll,
        }
    }

    /// Place an order. Status starts as `Pending` and `createdAt` is assigned
    /// by the store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the store rejects the write.
    #[instrument(skip(self, order), fields(toy_id = %order.toy_id))]
    pub async fn create(&self, order: NewOrder, owner: OrderOwner) -> Result<Order, StoreError> {
        let fields = to_fields(&OrderFields::new(order, owner))
            .map_err(StoreError::write(Self::COLLECTION))?;
        let doc = self
            .store
            .add(Self::COLLECTION, fields, Some("createdAt"))
            .await
            .map_err(StoreError::write(Self::COLLECTION))?;
        tracing::info!(order_id = %doc.id, "Order created");
        doc.decode(Self::COLLECTION)
    }

    /// Merge the set fields of `patch` into an order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no order has this id.
    /// Returns `StoreError::Write` if the store rejects the write.
    #[instrument(skip(self, patch), fields(order_id = %id))]
    pub async fn update(&self, id: &OrderId, patch: OrderPatch) -> Result<Order, StoreError> {
        let fields = to_fields(&patch).map_err(StoreError::write(Self::COLLECTION))?;
        self.store
            .merge(Self::COLLECTION, id.as_str(), fields)
            .await
            .map_err(StoreError::write(Self::COLLECTION))?
            .ok_or_else(|| StoreError::not_found(Self::COLLECTION, id.as_str()))?
            .decode(Self::COLLECTION)
    }

    /// Remove an order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no order has this id.
    /// Returns `StoreError::Write` if the store rejects the delete.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete(&self, id: &OrderId) -> Result<(), StoreError> {
        let existed = self
            .store
            .delete(Self::COLLECTION, id.as_str())
            .await
            .map_err(StoreError::write(Self::COLLECTION))?;
        if !existed {
            return Err(StoreError::not_found(Self::COLLECTION, id.as_str()));
        }
        tracing::info!("Order deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use santas_workshop_core::{OrderStatus, Priority, SessionId, ToyId, UserId};

    use super::*;
    use crate::db::MemoryDocumentStore;

    fn new_order(child: &str) -> NewOrder {
        NewOrder {
            child_name: child.to_string(),
            country: "Finland".to_string(),
            toy_id: ToyId::new("t1"),
            priority: Priority::Normal,
        }
    }

    async fn seeded(store: &MemoryDocumentStore) {
        let repo = OrderRepository::new(store);
        repo.create(new_order("Ana"), OrderOwner::User(UserId::new("u1")))
            .await
            .unwrap();
        repo.create(new_order("Ben"), OrderOwner::User(UserId::new("u2")))
            .await
            .unwrap();
        repo.create(
            new_order("Cai"),
            OrderOwner::Session(SessionId::new("anon_123")),
        )
        .await
        .unwrap();
    }

    fn names(orders: &[Order]) -> Vec<&str> {
        orders.iter().map(|o| o.child_name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_visibility_by_scope() {
        let store = MemoryDocumentStore::new();
        seeded(&store).await;
        let repo = OrderRepository::new(&store);

        let all = repo.get_all(&OrderScope::All).await.unwrap();
        assert_eq!(names(&all), vec!["Ana", "Ben", "Cai"]);

        let mine = repo
            .get_all(&OrderScope::User(UserId::new("u1")))
            .await
            .unwrap();
        assert_eq!(names(&mine), vec!["Ana"]);

        let anon = repo
            .get_all(&OrderScope::Session(SessionId::new("anon_123")))
            .await
            .unwrap();
        assert_eq!(names(&anon), vec!["Cai"]);
    }

    #[tokio::test]
    async fn test_unscoped_policy() {
        let store = MemoryDocumentStore::new();
        seeded(&store).await;

        let show_all = OrderRepository::new(&store);
        assert_eq!(show_all.get_all(&OrderScope::Unscoped).await.unwrap().len(), 3);

        let empty = OrderRepository::new(&store).with_unscoped(UnscopedOrderVisibility::Empty);
        assert!(empty.get_all(&OrderScope::Unscoped).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_create_stamps_defaults() {
        let store = MemoryDocumentStore::new();
        let repo = OrderRepository::new(&store);

        let order = repo
            .create(
                new_order("Dee"),
                OrderOwner::Session(SessionId::new("anon_1")),
            )
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.session_id, Some(SessionId::new("anon_1")));
        assert!(order.user_id.is_none());
        assert!(order.created_at.is_some());
    }

    #[tokio::test]
    async fn test_get_visible_hides_other_owners() {
        let store = MemoryDocumentStore::new();
        let repo = OrderRepository::new(&store);
        let order = repo
            .create(new_order("Eve"), OrderOwner::User(UserId::new("u1")))
            .await
            .unwrap();

        assert!(
            repo.get_visible(&order.id, &OrderScope::User(UserId::new("u1")))
                .await
                .is_ok()
        );
        assert!(
            repo.get_visible(&order.id, &OrderScope::User(UserId::new("u2")))
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(repo.get_visible(&order.id, &OrderScope::All).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_status_and_delete() {
        let store = MemoryDocumentStore::new();
        let repo = OrderRepository::new(&store);
        let order = repo
            .create(new_order("Fin"), OrderOwner::User(UserId::new("u1")))
            .await
            .unwrap();

        let updated = repo
            .update(
                &order.id,
                OrderPatch {
                    status: Some(OrderStatus::Shipped),
                    ..OrderPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert_eq!(updated.user_id, Some(UserId::new("u1")));

        repo.delete(&order.id).await.unwrap();
        assert!(repo.delete(&order.id).await.unwrap_err().is_not_found());
    }
}
