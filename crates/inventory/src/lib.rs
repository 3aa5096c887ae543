//! Inventory domain module.
//!
//! Per-product stock levels with bounds, deterministic warehouse locations,
//! and the global append-only movement ledger. Deterministic domain logic
//! only (no IO).

pub mod ledger;
pub mod location;
pub mod movement;
pub mod record;
pub mod stock;

pub use ledger::{Inventory, RestockSuggestion};
pub use location::{Location, LocationAllocator};
pub use movement::{ActorRef, DEFAULT_MARKUP_PERCENT, Direction, Movement, MovementKey, ProductRef};
pub use record::InventoryRecord;
pub use stock::Stock;
