//! Application data cache.
//!
//! Holds the last loaded snapshot of toys, elves and (per viewer scope)
//! orders, each with its own loading and error flags. Every refresh replaces
//! the snapshot wholesale. Loads take a generation ticket when they start; a
//! load that finishes after a newer one has started is discarded, so a slow
//! response can never overwrite a fresher one.
//!
//! A snapshot is served for at most `max_age`; the next read after that
//! reloads, so writes made outside this process show up. At most
//! `max_order_scopes` order scopes are kept.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::config::UnscopedOrderVisibility;
use crate::db::{DocumentStore, ElfRepository, OrderRepository, StoreError, ToyRepository};
use crate::models::{Elf, Order, OrderScope, Toy};
use crate::services::auth::IdentityEvent;

/// Point-in-time view of one cached collection.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    #[serde(skip)]
    loaded_at: Option<Instant>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            loaded_at: None,
        }
    }
}

impl<T> Snapshot<T> {
    /// Whether a load has completed successfully at least once.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }

    fn is_fresh(&self, max_age: Duration) -> bool {
        self.error.is_none()
            && self
                .loaded_at
                .is_some_and(|loaded_at| loaded_at.elapsed() < max_age)
    }
}

/// Loading/error flags of one collection, without the data.
#[derive(Debug, Clone, Serialize)]
pub struct SlotStatus {
    pub loaded: bool,
    pub loading: bool,
    pub error: Option<String>,
}

/// Flags for every cached collection.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub toys: SlotStatus,
    pub elves: SlotStatus,
    pub order_scopes: usize,
}

struct Slot<T> {
    state: RwLock<Snapshot<T>>,
    generation: AtomicU64,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            state: RwLock::new(Snapshot::default()),
            generation: AtomicU64::new(0),
        }
    }
}

impl<T: Clone> Slot<T> {
    async fn snapshot(&self) -> Snapshot<T> {
        self.state.read().await.clone()
    }

    async fn status(&self) -> SlotStatus {
        let state = self.state.read().await;
        SlotStatus {
            loaded: state.is_loaded(),
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    /// Return the cached snapshot, loading it first if it is missing, older
    /// than `max_age`, or the last load failed.
    async fn read<F>(
        &self,
        collection: &'static str,
        max_age: Duration,
        load: F,
    ) -> Result<Snapshot<T>, StoreError>
    where
        F: Future<Output = Result<Vec<T>, StoreError>>,
    {
        {
            let state = self.state.read().await;
            if state.is_fresh(max_age) {
                return Ok(state.clone());
            }
        }
        self.refresh(collection, load).await
    }

    async fn refresh<F>(&self, collection: &'static str, load: F) -> Result<Snapshot<T>, StoreError>
    where
        F: Future<Output = Result<Vec<T>, StoreError>>,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.loading = true;

        let result = load.await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            tracing::debug!(collection, ticket, "Dropping superseded load");
            return result.map(|_| state.clone());
        }
        state.loading = false;
        match result {
            Ok(items) => {
                tracing::debug!(collection, count = items.len(), "Cache refreshed");
                state.items = items;
                state.error = None;
                state.loaded_at = Some(Instant::now());
                Ok(state.clone())
            }
            Err(e) => {
                tracing::warn!(collection, error = %e, "Cache refresh failed");
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

/// Default time a snapshot is served before a read reloads it.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30);

/// Default number of order scopes kept at once.
pub const DEFAULT_MAX_ORDER_SCOPES: usize = 1024;

/// In-memory cache of the three record collections.
pub struct DataCache {
    store: Arc<dyn DocumentStore>,
    unscoped: UnscopedOrderVisibility,
    max_age: Duration,
    max_order_scopes: usize,
    toys: Slot<Toy>,
    elves: Slot<Elf>,
    orders: RwLock<HashMap<OrderScope, Arc<Slot<Order>>>>,
}

impl DataCache {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, unscoped: UnscopedOrderVisibility) -> Self {
        Self {
            store,
            unscoped,
            max_age: DEFAULT_MAX_AGE,
            max_order_scopes: DEFAULT_MAX_ORDER_SCOPES,
            toys: Slot::default(),
            elves: Slot::default(),
            orders: RwLock::new(HashMap::new()),
        }
    }

    /// Serve snapshots for at most `max_age` before reloading.
    #[must_use]
    pub const fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Keep at most `limit` order scopes.
    #[must_use]
    pub const fn with_scope_limit(mut self, limit: usize) -> Self {
        self.max_order_scopes = limit;
        self
    }

    /// Load toys and elves. Failures are recorded in the error flags and
    /// logged; they do not abort start-up.
    pub async fn warm(&self) {
        let (toys, elves) = tokio::join!(self.refresh_toys(), self.refresh_elves());
        if toys.is_ok() && elves.is_ok() {
            tracing::info!("Data cache warmed");
        }
    }

    /// Cached toys, loading them if needed.
    ///
    /// # Errors
    ///
    /// Returns the store error if a load was needed and failed.
    pub async fn toys(&self) -> Result<Snapshot<Toy>, StoreError> {
        self.toys
            .read(ToyRepository::COLLECTION, self.max_age, self.load_toys())
            .await
    }

    /// Cached elves, loading them if needed.
    ///
    /// # Errors
    ///
    /// Returns the store error if a load was needed and failed.
    pub async fn elves(&self) -> Result<Snapshot<Elf>, StoreError> {
        self.elves
            .read(ElfRepository::COLLECTION, self.max_age, self.load_elves())
            .await
    }

    /// Cached orders visible in `scope`, loading them if needed.
    ///
    /// # Errors
    ///
    /// Returns the store error if a load was needed and failed.
    pub async fn orders(&self, scope: &OrderScope) -> Result<Snapshot<Order>, StoreError> {
        let slot = self.order_slot(scope).await;
        slot.read(OrderRepository::COLLECTION, self.max_age, self.load_orders(scope))
            .await
    }

    /// Reload toys.
    ///
    /// # Errors
    ///
    /// Returns the store error if the load failed.
    #[instrument(skip(self))]
    pub async fn refresh_toys(&self) -> Result<Snapshot<Toy>, StoreError> {
        self.toys
            .refresh(ToyRepository::COLLECTION, self.load_toys())
            .await
    }

    /// Reload elves.
    ///
    /// # Errors
    ///
    /// Returns the store error if the load failed.
    #[instrument(skip(self))]
    pub async fn refresh_elves(&self) -> Result<Snapshot<Elf>, StoreError> {
        self.elves
            .refresh(ElfRepository::COLLECTION, self.load_elves())
            .await
    }

    /// Reload the orders visible in `scope`.
    ///
    /// # Errors
    ///
    /// Returns the store error if the load failed.
    #[instrument(skip(self))]
    pub async fn refresh_orders(&self, scope: &OrderScope) -> Result<Snapshot<Order>, StoreError> {
        let slot = self.order_slot(scope).await;
        slot.refresh(OrderRepository::COLLECTION, self.load_orders(scope))
            .await
    }

    /// Forget every cached order scope. An order write can change what any
    /// scope sees, so writers invalidate and the next read reloads.
    pub async fn invalidate_orders(&self) {
        self.orders.write().await.clear();
    }

    /// Reload toys after a write. A failed reload stays in the error flag.
    pub async fn toys_changed(&self) {
        let _ = self.refresh_toys().await;
    }

    /// Reload elves after a write. A failed reload stays in the error flag.
    pub async fn elves_changed(&self) {
        let _ = self.refresh_elves().await;
    }

    /// Drop every order scope after a write and reload the writer's.
    pub async fn orders_changed(&self, scope: &OrderScope) {
        self.invalidate_orders().await;
        let _ = self.refresh_orders(scope).await;
    }

    /// Forget one cached order scope.
    pub async fn drop_scope(&self, scope: &OrderScope) {
        self.orders.write().await.remove(scope);
    }

    /// Loading and error flags for every collection.
    pub async fn status(&self) -> CacheStatus {
        CacheStatus {
            toys: self.toys.status().await,
            elves: self.elves.status().await,
            order_scopes: self.orders.read().await.len(),
        }
    }

    /// Cached toys without triggering a load.
    pub async fn toy_snapshot(&self) -> Snapshot<Toy> {
        self.toys.snapshot().await
    }

    /// React to a change of identity in some session.
    pub async fn handle_identity_event(&self, event: &IdentityEvent) {
        match event {
            IdentityEvent::SignedIn {
                previous_session, ..
            } => {
                if let Some(session) = previous_session {
                    self.drop_scope(&OrderScope::Session(session.clone())).await;
                }
                if let Some(scope) = event.scope() {
                    // The failure is already recorded in the slot's error flag.
                    let _ = self.refresh_orders(&scope).await;
                }
            }
            IdentityEvent::SignedOut { user_id } => {
                self.drop_scope(&OrderScope::User(user_id.clone())).await;
            }
        }
    }

    /// Follow identity changes until the gateway is dropped.
    pub fn spawn_identity_listener(
        self: Arc<Self>,
        mut events: broadcast::Receiver<IdentityEvent>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => self.handle_identity_event(&event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Identity events lagged, dropping order cache");
                        self.invalidate_orders().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    async fn order_slot(&self, scope: &OrderScope) -> Arc<Slot<Order>> {
        if let Some(slot) = self.orders.read().await.get(scope) {
            return Arc::clone(slot);
        }
        let mut scopes = self.orders.write().await;
        if !scopes.contains_key(scope) && scopes.len() >= self.max_order_scopes {
            let max_age = self.max_age;
            scopes.retain(|_, slot| match slot.state.try_read() {
                Ok(state) => state.loading || state.is_fresh(max_age),
                Err(_) => true,
            });
            if scopes.len() >= self.max_order_scopes {
                tracing::debug!(scopes = scopes.len(), "Order scope limit reached, dropping all");
                scopes.clear();
            }
        }
        Arc::clone(scopes.entry(scope.clone()).or_default())
    }

    async fn load_toys(&self) -> Result<Vec<Toy>, StoreError> {
        ToyRepository::new(self.store.as_ref()).get_all().await
    }

    async fn load_elves(&self) -> Result<Vec<Elf>, StoreError> {
        ElfRepository::new(self.store.as_ref()).get_all().await
    }

    async fn load_orders(&self, scope: &OrderScope) -> Result<Vec<Order>, StoreError> {
        OrderRepository::new(self.store.as_ref())
            .with_unscoped(self.unscoped)
            .get_all(scope)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use santas_workshop_core::{Difficulty, Priority, SessionId, ToyId, UserId, UserRole};

    use super::*;
    use crate::db::MemoryDocumentStore;
    use crate::models::{NewOrder, NewToy, OrderOwner};

    fn cache() -> (DataCache, Arc<MemoryDocumentStore>) {
        let store = Arc::new(MemoryDocumentStore::new());
        (
            DataCache::new(store.clone(), UnscopedOrderVisibility::ShowAll),
            store,
        )
    }

    fn robot() -> NewToy {
        NewToy {
            name: "Robot".to_string(),
            category: "Tech".to_string(),
            difficulty: Difficulty::Medium,
            in_stock: None,
        }
    }

    #[tokio::test]
    async fn test_read_loads_once_then_serves_snapshot() {
        let (cache, store) = cache();
        ToyRepository::new(store.as_ref()).create(robot()).await.unwrap();

        let first = cache.toys().await.unwrap();
        assert_eq!(first.items.len(), 1);
        assert!(first.is_loaded());

        ToyRepository::new(store.as_ref()).create(robot()).await.unwrap();
        assert_eq!(cache.toys().await.unwrap().items.len(), 1);
        assert_eq!(cache.refresh_toys().await.unwrap().items.len(), 2);
    }

    #[tokio::test]
    async fn test_expired_snapshot_is_reloaded() {
        let store = Arc::new(MemoryDocumentStore::new());
        let cache = DataCache::new(store.clone(), UnscopedOrderVisibility::ShowAll)
            .with_max_age(Duration::ZERO);
        let scope = OrderScope::User(UserId::new("u1"));
        assert!(cache.toys().await.unwrap().items.is_empty());
        assert!(cache.orders(&scope).await.unwrap().items.is_empty());

        ToyRepository::new(store.as_ref()).create(robot()).await.unwrap();
        OrderRepository::new(store.as_ref())
            .create(
                NewOrder {
                    child_name: "Aino".to_string(),
                    country: "Finland".to_string(),
                    toy_id: ToyId::new("toy-sled"),
                    priority: Priority::High,
                },
                OrderOwner::User(UserId::new("u1")),
            )
            .await
            .unwrap();

        assert_eq!(cache.toys().await.unwrap().items.len(), 1);
        assert_eq!(cache.orders(&scope).await.unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_sets_error_flag_and_keeps_items() {
        let (cache, store) = cache();
        ToyRepository::new(store.as_ref()).create(robot()).await.unwrap();
        cache.refresh_toys().await.unwrap();

        store.set_simulate_read_error(true);
        let err = cache.refresh_toys().await.unwrap_err();
        assert!(matches!(err, StoreError::Fetch { .. }));

        let status = cache.status().await;
        assert!(status.toys.error.is_some());
        assert!(!status.toys.loading);
        assert_eq!(cache.toy_snapshot().await.items.len(), 1);

        store.set_simulate_read_error(false);
        cache.toys().await.unwrap();
        assert!(cache.status().await.toys.error.is_none());
    }

    #[tokio::test]
    async fn test_superseded_load_is_dropped() {
        let slot: Slot<u32> = Slot::default();
        let slow = slot.refresh("numbers", async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(vec![1])
        });
        let fast = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            slot.refresh("numbers", async { Ok(vec![2, 2]) }).await
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert_eq!(fast.unwrap().items, vec![2, 2]);
        assert_eq!(slow.unwrap().items, vec![2, 2]);
        assert_eq!(slot.snapshot().await.items, vec![2, 2]);
        assert!(!slot.snapshot().await.loading);
    }

    #[tokio::test]
    async fn test_orders_are_cached_per_scope() {
        let (cache, _) = cache();
        let user = OrderScope::User(UserId::new("u1"));
        let anon = OrderScope::Session(SessionId::new("anon_1"));
        cache.orders(&user).await.unwrap();
        cache.orders(&anon).await.unwrap();
        assert_eq!(cache.status().await.order_scopes, 2);

        cache.invalidate_orders().await;
        assert_eq!(cache.status().await.order_scopes, 0);
    }

    #[tokio::test]
    async fn test_order_scopes_are_bounded() {
        let store = Arc::new(MemoryDocumentStore::new());
        let cache = DataCache::new(store, UnscopedOrderVisibility::ShowAll).with_scope_limit(2);
        for n in 0..10 {
            let scope = OrderScope::Session(SessionId::new(format!("anon_{n}")));
            cache.orders(&scope).await.unwrap();
            assert!(cache.status().await.order_scopes <= 2);
        }
        let last = OrderScope::Session(SessionId::new("anon_9"));
        assert!(cache.orders.read().await.contains_key(&last));
    }

    #[tokio::test]
    async fn test_stale_order_scopes_are_pruned_first() {
        let store = Arc::new(MemoryDocumentStore::new());
        let cache = DataCache::new(store, UnscopedOrderVisibility::ShowAll)
            .with_max_age(Duration::ZERO)
            .with_scope_limit(2);
        cache.orders(&OrderScope::User(UserId::new("u1"))).await.unwrap();
        cache.orders(&OrderScope::User(UserId::new("u2"))).await.unwrap();
        cache.orders(&OrderScope::User(UserId::new("u3"))).await.unwrap();

        let scopes = cache.orders.read().await;
        assert_eq!(scopes.len(), 1);
        assert!(scopes.contains_key(&OrderScope::User(UserId::new("u3"))));
    }

    #[tokio::test]
    async fn test_sign_in_drops_anonymous_scope() {
        let (cache, _) = cache();
        let anon = SessionId::new("anon_1");
        cache
            .orders(&OrderScope::Session(anon.clone()))
            .await
            .unwrap();

        cache
            .handle_identity_event(&IdentityEvent::SignedIn {
                user_id: UserId::new("u1"),
                role: UserRole::User,
                previous_session: Some(anon.clone()),
            })
            .await;

        let scopes = cache.orders.read().await;
        assert!(!scopes.contains_key(&OrderScope::Session(anon)));
        assert!(scopes.contains_key(&OrderScope::User(UserId::new("u1"))));
    }

    #[tokio::test]
    async fn test_sign_out_drops_user_scope() {
        let (cache, _) = cache();
        let scope = OrderScope::User(UserId::new("u1"));
        cache.orders(&scope).await.unwrap();
        cache
            .handle_identity_event(&IdentityEvent::SignedOut {
                user_id: UserId::new("u1"),
            })
            .await;
        assert_eq!(cache.status().await.order_scopes, 0);
    }
}
