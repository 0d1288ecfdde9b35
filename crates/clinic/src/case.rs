use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clinicops_core::{AppointmentId, CaseId, ClinicId};

/// Treatment case status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    Created,
    Ready,
    InProgress,
    Completed,
    Cancelled,
    #[serde(other)]
    Other,
}

impl CaseStatus {
    pub fn is_completed(self) -> bool {
        matches!(self, CaseStatus::Completed)
    }
}

/// A treatment record derived from an appointment.
///
/// At most one case exists per appointment; the case agent enforces this when
/// it opens cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: CaseId,
    pub clinic_id: ClinicId,
    #[serde(default)]
    pub appointment_id: Option<AppointmentId>,
    #[serde(default)]
    pub patient: Option<String>,
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Case {
    /// Open a new case for an appointment in `created` status.
    pub fn open(
        id: CaseId,
        clinic_id: ClinicId,
        appointment_id: AppointmentId,
        patient: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            clinic_id,
            appointment_id: Some(appointment_id),
            patient,
            status: CaseStatus::Created,
            created_at: Some(now),
        }
    }

    pub fn with_status(mut self, status: CaseStatus) -> Self {
        self.status = status;
        self
    }
}
