//! Domain models for the workshop console.
//!
//! Stored documents use camelCase field names; every record type here
//! serializes with the same spelling so API payloads and stored documents
//! match.

pub mod elf;
pub mod order;
pub mod session;
pub mod toy;
pub mod user;

pub use elf::{Elf, ElfForm, ElfPatch, NewElf};
pub use order::{NewOrder, Order, OrderForm, OrderOwner, OrderPatch, OrderScope};
pub use session::{CurrentUser, Viewer};
pub use toy::{NewToy, Toy, ToyForm, ToyPatch};
pub use user::{Identity, RoleRecord};
