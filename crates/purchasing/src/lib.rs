//! Purchasing records (replenishment orders raised for low stock).

pub mod order;

pub use order::{PurchaseOrder, PurchaseOrderStatus};
