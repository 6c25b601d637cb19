//! Business logic services for the console.
//!
//! # Services
//!
//! - `anonymous` - Anonymous visitor session ids
//! - `auth` - Auth/session gateway over an identity provider
//! - `cache` - Application data cache with stale-load protection
//! - `countdown` - Time left until Christmas
//! - `query` - Listing filters, sorting and dashboard stats
//! - `storage` - Transient per-visitor storage
//! - `theme` - Light/dark theme preference

pub mod anonymous;
pub mod auth;
pub mod cache;
pub mod countdown;
pub mod query;
pub mod storage;
pub mod theme;

pub use auth::{AuthError, AuthGateway, AuthOutcome, AuthState, IdentityEvent};
pub use cache::DataCache;
pub use countdown::Countdown;
pub use storage::{MemoryStorage, StorageError, TransientStorage};
