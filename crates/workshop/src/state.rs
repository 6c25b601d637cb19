//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::WorkshopConfig;
use crate::db::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use crate::services::auth::{AuthGateway, LocalIdentityProvider};
use crate::services::cache::DataCache;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Owns the record store, the data cache and
/// the auth gateway; the cache follows the gateway's identity events.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WorkshopConfig,
    store: Arc<dyn DocumentStore>,
    cache: Arc<DataCache>,
    auth: AuthGateway,
}

impl AppState {
    /// State over a `PostgreSQL` document store.
    #[must_use]
    pub fn with_pool(config: WorkshopConfig, pool: PgPool) -> Self {
        Self::build(config, Arc::new(PgDocumentStore::new(pool)))
    }

    /// State over an in-memory document store.
    #[must_use]
    pub fn in_memory(config: WorkshopConfig) -> Self {
        Self::build(config, Arc::new(MemoryDocumentStore::new()))
    }

    /// State over any document store.
    ///
    /// Spawns the cache's identity listener, so this must run inside a Tokio
    /// runtime.
    #[must_use]
    pub fn with_store(config: WorkshopConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self::build(config, store)
    }

    fn build(config: WorkshopConfig, store: Arc<dyn DocumentStore>) -> Self {
        let provider = Arc::new(LocalIdentityProvider::new(Arc::clone(&store)));
        let auth = AuthGateway::new(Arc::clone(&store), provider);
        let cache = Arc::new(
            DataCache::new(Arc::clone(&store), config.unscoped_orders)
                .with_max_age(config.cache_max_age),
        );
        Arc::clone(&cache).spawn_identity_listener(auth.subscribe());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                cache,
                auth,
            }),
        }
    }

    /// Get a reference to the workshop configuration.
    #[must_use]
    pub fn config(&self) -> &WorkshopConfig {
        &self.inner.config
    }

    /// Get a reference to the record store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the data cache.
    #[must_use]
    pub fn cache(&self) -> &DataCache {
        &self.inner.cache
    }

    /// Get a reference to the auth gateway.
    #[must_use]
    pub fn auth(&self) -> &AuthGateway {
        &self.inner.auth
    }
}
