//! Clinic-isolated storage behind the agents' repository contract.

pub mod clinic_store;
pub mod clinic_table;

pub use clinic_store::{InMemoryClinicStore, Restock};
pub use clinic_table::ClinicTable;
