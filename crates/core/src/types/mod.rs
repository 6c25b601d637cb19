//! Core types for Santa's Workshop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod energy;
pub mod id;
pub mod status;

pub use email::{Email, EmailError};
pub use energy::{Energy, EnergyBand};
pub use id::*;
pub use status::*;
