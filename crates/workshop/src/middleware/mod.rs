//! HTTP middleware for the console.
//!
//! - `session` - tower-sessions layer (`PostgreSQL` or in-memory store)
//! - `auth` - Extractors for the signed-in user, admins and the viewer

pub mod auth;
pub mod session;

pub use auth::{AuthRejection, OptionalUser, RequireAdmin, ViewerContext};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, migrate_store, postgres_store};
