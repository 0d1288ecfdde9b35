//! Invoicing records for clinic treatments.

pub mod invoice;

pub use invoice::Invoice;
