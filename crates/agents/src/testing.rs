//! In-memory repository with failure injection for agent unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use clinicops_clinic::{Appointment, Case, Clinic};
use clinicops_core::{AppointmentId, ClinicId, Sku};
use clinicops_inventory::InventoryItem;
use clinicops_invoicing::Invoice;
use clinicops_purchasing::PurchaseOrder;

use crate::context::{AgentContext, FixedClock, RecordingNotifier, SequentialIdGenerator};
use crate::repository::{ClinicRepository, RepositoryError};

#[derive(Debug, Default)]
pub struct FakeRepository {
    pub clinics: Mutex<Vec<Clinic>>,
    pub appointments: Mutex<Vec<Appointment>>,
    pub cases: Mutex<Vec<Case>>,
    pub invoices: Mutex<Vec<Invoice>>,
    pub inventory: Mutex<Vec<InventoryItem>>,
    pub purchase_orders: Mutex<Vec<PurchaseOrder>>,
    pub fail_reads: AtomicBool,
    pub reject_cases_for: Mutex<HashSet<AppointmentId>>,
    pub reject_orders_for: Mutex<HashSet<Sku>>,
}

impl FakeRepository {
    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(RepositoryError::Unavailable("injected read failure".into()))
        } else {
            Ok(())
        }
    }

    pub fn cases(&self) -> Vec<Case> {
        self.cases.lock().unwrap().clone()
    }

    pub fn purchase_orders(&self) -> Vec<PurchaseOrder> {
        self.purchase_orders.lock().unwrap().clone()
    }

    pub fn push_clinic(&self, clinic: Clinic) {
        self.clinics.lock().unwrap().push(clinic);
    }

    pub fn push_appointment(&self, a: Appointment) {
        self.appointments.lock().unwrap().push(a);
    }

    pub fn push_case(&self, c: Case) {
        self.cases.lock().unwrap().push(c);
    }

    pub fn push_invoice(&self, i: Invoice) {
        self.invoices.lock().unwrap().push(i);
    }

    pub fn push_item(&self, i: InventoryItem) {
        self.inventory.lock().unwrap().push(i);
    }
}

impl ClinicRepository for FakeRepository {
    fn get_clinic(&self, clinic_id: &ClinicId) -> Result<Option<Clinic>, RepositoryError> {
        self.check_reads()?;
        Ok(self
            .clinics
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.id == clinic_id)
            .cloned())
    }

    fn list_clinics(&self) -> Result<Vec<Clinic>, RepositoryError> {
        self.check_reads()?;
        Ok(self.clinics.lock().unwrap().clone())
    }

    fn appointments_by_clinic(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        self.check_reads()?;
        Ok(scoped(&self.appointments, |a| &a.clinic_id == clinic_id))
    }

    fn cases_by_clinic(&self, clinic_id: &ClinicId) -> Result<Vec<Case>, RepositoryError> {
        self.check_reads()?;
        Ok(scoped(&self.cases, |c| &c.clinic_id == clinic_id))
    }

    fn invoices_by_clinic(&self, clinic_id: &ClinicId) -> Result<Vec<Invoice>, RepositoryError> {
        self.check_reads()?;
        Ok(scoped(&self.invoices, |i| &i.clinic_id == clinic_id))
    }

    fn inventory_by_clinic(
        &self,
        clinic_id: &ClinicId,
    ) -> Result<Vec<InventoryItem>, RepositoryError> {
        self.check_reads()?;
        Ok(scoped(&self.inventory, |i| &i.clinic_id == clinic_id))
    }

    fn add_case(&self, case: Case) -> Result<(), RepositoryError> {
        if let Some(appt) = &case.appointment_id {
            if self.reject_cases_for.lock().unwrap().contains(appt) {
                return Err(RepositoryError::Conflict(format!("case for {appt}")));
            }
        }
        self.cases.lock().unwrap().push(case);
        Ok(())
    }

    fn add_purchase_order(&self, order: PurchaseOrder) -> Result<(), RepositoryError> {
        if self.reject_orders_for.lock().unwrap().contains(&order.sku) {
            return Err(RepositoryError::Unavailable(format!("po for {}", order.sku)));
        }
        self.purchase_orders.lock().unwrap().push(order);
        Ok(())
    }
}

fn scoped<T: Clone>(rows: &Mutex<Vec<T>>, keep: impl Fn(&T) -> bool) -> Vec<T> {
    rows.lock().unwrap().iter().filter(|r| keep(r)).cloned().collect()
}

pub fn clinic_id() -> ClinicId {
    ClinicId::new("clinic-1")
}

/// 2025-06-02 12:00 UTC (a Monday).
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
}

pub struct Harness {
    pub repo: Arc<FakeRepository>,
    pub clock: Arc<FixedClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub ctx: AgentContext<FakeRepository>,
}

pub fn harness() -> Harness {
    let repo = Arc::new(FakeRepository::default());
    let clock = Arc::new(FixedClock::new(test_now()));
    let notifier = Arc::new(RecordingNotifier::new());
    let ctx = AgentContext::new(repo.clone())
        .with_clock(clock.clone())
        .with_ids(Arc::new(SequentialIdGenerator::new()))
        .with_notifier(notifier.clone());
    Harness {
        repo,
        clock,
        notifier,
        ctx,
    }
}

pub fn appointment(id: &str, scheduled_at: Option<&str>) -> Appointment {
    let mut a = Appointment::booked(AppointmentId::new(id), clinic_id(), format!("patient-{id}"));
    a.scheduled_at = scheduled_at.map(str::to_string);
    a
}
