//! HTTP route handlers for the console.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Store reachability and cache flags
//!
//! # Auth
//! POST /auth/login                   - Sign in
//! POST /auth/register                - Create account and sign in
//! POST /auth/logout                  - Sign out
//! GET  /auth/me                      - Current identity
//!
//! # Toys
//! GET  /api/toys                     - List (category, inStockOnly, sort)
//! POST /api/toys                     - Create
//! POST /api/toys/refresh             - Reload from the store, then list
//! GET  /api/toys/{id}                - Detail
//! PUT  /api/toys/{id}                - Edit (admin)
//! DELETE /api/toys/{id}              - Remove (admin)
//! POST /api/toys/{id}/toggle-stock   - Flip in-stock flag
//!
//! # Orders (scoped to the viewer)
//! GET  /api/orders                   - List (status)
//! POST /api/orders                   - Place an order
//! POST /api/orders/refresh           - Reload from the store, then list
//! GET  /api/orders/{id}              - Detail
//! PUT  /api/orders/{id}              - Edit (admin)
//! DELETE /api/orders/{id}            - Remove (admin)
//!
//! # Elves
//! GET  /api/elves                    - Roster
//! POST /api/elves                    - Create (admin)
//! POST /api/elves/refresh            - Reload from the store, then list
//! GET  /api/elves/{id}               - Profile
//! PUT  /api/elves/{id}               - Edit (admin)
//! DELETE /api/elves/{id}             - Remove (admin)
//! POST /api/elves/{id}/boost         - +10 energy
//!
//! # Dashboard
//! GET  /api/dashboard                - Stats, notices, countdown
//! GET  /api/countdown                - Time until Christmas
//!
//! # Preferences
//! GET  /api/preferences/theme        - Current theme
//! POST /api/preferences/theme        - Set theme
//! POST /api/preferences/theme/toggle - Toggle theme
//! ```

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod elves;
pub mod health;
pub mod orders;
pub mod toys;

use axum::Router;

use crate::state::AppState;

/// Build every route of the console.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(toys::router())
        .merge(orders::router())
        .merge(elves::router())
        .merge(dashboard::router())
        .merge(api::router())
}
