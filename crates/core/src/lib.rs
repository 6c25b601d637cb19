//! Santa's Workshop Core - Shared domain types.
//!
//! This crate provides the types used across all workshop components:
//! - `workshop` - The console service (record store client, auth, cache, routes)
//! - `cli` - Command-line tools for migrations, roles and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, enumerations and the clamped [`Energy`] level

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
