//! Inventory records for clinic consumables.
//!
//! Deterministic stock arithmetic only (no IO, no storage).

pub mod item;

pub use item::InventoryItem;
