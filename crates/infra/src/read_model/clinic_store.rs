use std::collections::BTreeMap;
use std::sync::RwLock;

use tracing::debug;

use clinicops_agents::{ClinicRepository, RepositoryError};
use clinicops_clinic::{Appointment, Case, Clinic};
use clinicops_core::{AppointmentId, CaseId, ClinicId, InvoiceId, PurchaseOrderId, Sku};
use clinicops_inventory::InventoryItem;
use clinicops_invoicing::Invoice;
use clinicops_purchasing::PurchaseOrder;

use super::clinic_table::ClinicTable;

/// Restock request for [`InMemoryClinicStore::add_inventory`].
#[derive(Debug, Clone, PartialEq)]
pub struct Restock {
    pub sku: Sku,
    pub quantity: u64,
    pub name: Option<String>,
    pub unit_price: Option<f64>,
}

/// In-memory clinic store for tests/dev and the single-process server.
///
/// Each read and write holds one table lock; nothing spans calls.
#[derive(Debug, Default)]
pub struct InMemoryClinicStore {
    clinics: RwLock<BTreeMap<ClinicId, Clinic>>,
    appointments: ClinicTable<AppointmentId, Appointment>,
    cases: ClinicTable<CaseId, Case>,
    invoices: ClinicTable<InvoiceId, Invoice>,
    inventory: ClinicTable<Sku, InventoryItem>,
    purchase_orders: ClinicTable<PurchaseOrderId, PurchaseOrder>,
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("clinic lock poisoned".into())
}

impl InMemoryClinicStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_clinic(&self, clinic: Clinic) -> Result<(), RepositoryError> {
        let mut clinics = self.clinics.write().map_err(|_| poisoned())?;
        clinics.insert(clinic.id.clone(), clinic);
        Ok(())
    }

    /// Apply `f` to the clinic, registering it first if unknown.
    fn update_clinic(
        &self,
        clinic_id: &ClinicId,
        f: impl FnOnce(&mut Clinic),
    ) -> Result<Clinic, RepositoryError> {
        let mut clinics = self.clinics.write().map_err(|_| poisoned())?;
        let clinic = clinics
            .entry(clinic_id.clone())
            .or_insert_with(|| Clinic::new(clinic_id.clone()));
        f(clinic);
        Ok(clinic.clone())
    }

    /// Clinics first seen through a record write still show up in scheduled runs.
    fn register_clinic(&self, clinic_id: &ClinicId) -> Result<(), RepositoryError> {
        self.update_clinic(clinic_id, |_| {}).map(|_| ())
    }

    /// Set the clinic's WhatsApp number, registering the clinic if unknown.
    pub fn set_whatsapp(
        &self,
        clinic_id: &ClinicId,
        number: &str,
    ) -> Result<Clinic, RepositoryError> {
        self.update_clinic(clinic_id, |c| c.whatsapp_number = Some(number.to_string()))
    }

    /// Store the working-hours document, registering the clinic if unknown.
    pub fn set_working_hours(
        &self,
        clinic_id: &ClinicId,
        hours: String,
    ) -> Result<Clinic, RepositoryError> {
        self.update_clinic(clinic_id, |c| c.working_hours = Some(hours))
    }

    pub fn add_appointment(&self, appointment: Appointment) -> Result<(), RepositoryError> {
        let clinic_id = appointment.clinic_id.clone();
        debug!(clinic = %clinic_id, appointment = %appointment.id, "store appointment");
        self.appointments.insert(clinic_id.clone(), appointment.id.clone(), appointment)?;
        self.register_clinic(&clinic_id)
    }

    /// Mark an appointment cancelled; `NotFound` if the clinic has no such appointment.
    pub fn cancel_appointment(
        &self,
        clinic_id: &ClinicId,
        appointment_id: &AppointmentId,
    ) -> Result<Appointment, RepositoryError> {
        self.appointments.update(clinic_id, appointment_id, Appointment::cancel)
    }

    pub fn add_invoice(&self, invoice: Invoice) -> Result<(), RepositoryError> {
        let clinic_id = invoice.clinic_id.clone();
        debug!(clinic = %clinic_id, invoice = %invoice.id, "store invoice");
        self.invoices.insert(clinic_id.clone(), invoice.id.clone(), invoice)?;
        self.register_clinic(&clinic_id)
    }

    /// Mark an invoice paid wherever it lives; `NotFound` if no clinic has it.
    pub fn mark_invoice_paid(&self, invoice_id: &InvoiceId) -> Result<Invoice, RepositoryError> {
        let (clinic_id, _) = self
            .invoices
            .find_key(invoice_id)?
            .ok_or_else(|| RepositoryError::NotFound(format!("invoice {invoice_id}")))?;
        self.invoices.update(&clinic_id, invoice_id, Invoice::mark_paid)
    }

    /// Add stock for a SKU, creating the item when it is new.
    ///
    /// Name and price only overwrite the stored values when provided.
    pub fn add_inventory(
        &self,
        clinic_id: &ClinicId,
        restock: Restock,
    ) -> Result<InventoryItem, RepositoryError> {
        let Restock {
            sku,
            quantity,
            name,
            unit_price,
        } = restock;

        let item = self
            .inventory
            .upsert_with(clinic_id.clone(), sku.clone(), |existing| {
                let mut item =
                    existing.unwrap_or_else(|| InventoryItem::new(clinic_id.clone(), sku, 0));
                item.restock(quantity);
                if let Some(name) = name {
                    item.name = Some(name);
                }
                if let Some(price) = unit_price {
                    item.unit_price = price;
                }
                item
            })?;
        self.register_clinic(clinic_id)?;
        Ok(item)
    }

    /// Remove stock, never going below zero; `NotFound` for an unknown SKU.
    pub fn decrement_inventory(
        &self,
        clinic_id: &ClinicId,
        sku: &Sku,
        amount: u64,
    ) -> Result<InventoryItem, RepositoryError> {
        self.inventory.update(clinic_id, sku, |item| item.decrement(amount))
    }

    pub fn purchase_orders_by_clinic(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Vec<PurchaseOrder>, RepositoryError> {
        self.purchase_orders.list(clinic_id)
    }
}

impl ClinicRepository for InMemoryClinicStore {
    fn get_clinic(&self, clinic_id: &ClinicId) -> Result<Option<Clinic>, RepositoryError> {
        let clinics = self.clinics.read().map_err(|_| poisoned())?;
        Ok(clinics.get(clinic_id).cloned())
    }

    fn list_clinics(&self) -> Result<Vec<Clinic>, RepositoryError> {
        let clinics = self.clinics.read().map_err(|_| poisoned())?;
        Ok(clinics.values().cloned().collect())
    }

    fn appointments_by_clinic(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        self.appointments.list(clinic_id)
    }

    fn cases_by_clinic(&self, clinic_id: &ClinicId) -> Result<Vec<Case>, RepositoryError> {
        self.cases.list(clinic_id)
    }

    fn invoices_by_clinic(&self, clinic_id: &ClinicId) -> Result<Vec<Invoice>, RepositoryError> {
        self.invoices.list(clinic_id)
    }

    fn inventory_by_clinic(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Vec<InventoryItem>, RepositoryError> {
        self.inventory.list(clinic_id)
    }

    fn add_case(&self, case: Case) -> Result<(), RepositoryError> {
        self.cases.insert(case.clinic_id.clone(), case.id.clone(), case)
    }

    fn add_purchase_order(&self, order: PurchaseOrder) -> Result<(), RepositoryError> {
        self.purchase_orders.insert(order.clinic_id.clone(), order.id.clone(), order)
    }
}
