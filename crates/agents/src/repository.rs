use thiserror::Error;

use clinicops_clinic::{Appointment, Case, Clinic};
use clinicops_core::ClinicId;
use clinicops_inventory::InventoryItem;
use clinicops_invoicing::Invoice;
use clinicops_purchasing::PurchaseOrder;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Clinic-scoped data access used by the agents.
///
/// Each call is expected to be individually consistent; nothing spans calls, so
/// an agent run observes whatever the store holds at each read.
pub trait ClinicRepository: Send + Sync + 'static {
    fn get_clinic(&self, clinic_id: &ClinicId) -> Result<Option<Clinic>, RepositoryError>;

    /// All clinics, used by scheduled runs.
    fn list_clinics(&self) -> Result<Vec<Clinic>, RepositoryError>;

    fn appointments_by_clinic(&self, clinic_id: &ClinicId)
    -> Result<Vec<Appointment>, RepositoryError>;

    fn cases_by_clinic(&self, clinic_id: &ClinicId) -> Result<Vec<Case>, RepositoryError>;

    fn invoices_by_clinic(&self, clinic_id: &ClinicId) -> Result<Vec<Invoice>, RepositoryError>;

    fn inventory_by_clinic(&self, clinic_id: &ClinicId)
    -> Result<Vec<InventoryItem>, RepositoryError>;

    fn add_case(&self, case: Case) -> Result<(), RepositoryError>;

    fn add_purchase_order(&self, order: PurchaseOrder) -> Result<(), RepositoryError>;
}
