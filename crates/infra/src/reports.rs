//! Read-only clinic snapshots served alongside the agent reports.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clinicops_agents::{ClinicRepository, RepositoryError};
use clinicops_clinic::{Appointment, Case, Clinic};
use clinicops_core::ClinicId;
use clinicops_invoicing::Invoice;

/// Everything the dashboard shows for one clinic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicDashboard {
    /// `None` for a clinic that has no record yet.
    pub clinic: Option<Clinic>,
    pub appointments: Vec<Appointment>,
    pub cases: Vec<Case>,
    pub invoices: Vec<Invoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub month: DateTime<Utc>,
    /// Sum of every invoice amount, paid or not.
    pub revenue: f64,
    pub invoices_count: usize,
}

pub fn dashboard<R>(repo: &R, clinic_id: &ClinicId) -> Result<ClinicDashboard, RepositoryError>
where
    R: ClinicRepository + ?Sized,
{
    Ok(ClinicDashboard {
        clinic: repo.get_clinic(clinic_id)?,
        appointments: repo.appointments_by_clinic(clinic_id)?,
        cases: repo.cases_by_clinic(clinic_id)?,
        invoices: repo.invoices_by_clinic(clinic_id)?,
    })
}

pub fn monthly_report<R>(
    repo: &R,
    clinic_id: &ClinicId,
    now: DateTime<Utc>,
) -> Result<MonthlyReport, RepositoryError>
where
    R: ClinicRepository + ?Sized,
{
    let invoices = repo.invoices_by_clinic(clinic_id)?;
    Ok(MonthlyReport {
        month: now,
        revenue: invoices.iter().map(|i| i.amount).sum(),
        invoices_count: invoices.len(),
    })
}
