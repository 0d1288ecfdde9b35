use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use clinicops_core::{AppointmentId, ClinicId};

/// Appointment lifecycle status.
///
/// Statuses written by other tools that this crate does not know about
/// deserialize to `Other` instead of failing the whole read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Booked,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
    #[serde(other)]
    Other,
}

/// A booked appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub clinic_id: ClinicId,
    /// Patient reference as captured at booking time.
    #[serde(default)]
    pub patient: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Raw scheduled date/time as stored; see [`parse_schedule`].
    #[serde(default, alias = "date")]
    pub scheduled_at: Option<String>,
    /// Free-form time-of-day column kept for display.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn booked(id: AppointmentId, clinic_id: ClinicId, patient: impl Into<String>) -> Self {
        Self {
            id,
            clinic_id,
            patient: Some(patient.into()),
            patient_name: None,
            phone: None,
            email: None,
            scheduled_at: None,
            time: None,
            status: AppointmentStatus::Booked,
            created_at: None,
        }
    }

    pub fn scheduled_for(mut self, raw: impl Into<String>) -> Self {
        self.scheduled_at = Some(raw.into());
        self
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Contact details captured by the detailed booking form.
    pub fn with_contact(
        mut self,
        patient_name: impl Into<String>,
        phone: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        self.patient_name = Some(patient_name.into());
        self.phone = Some(phone.into());
        self.email = email;
        self
    }

    pub fn at_time(mut self, time: Option<String>) -> Self {
        self.time = time;
        self
    }

    pub fn cancel(&mut self) {
        self.status = AppointmentStatus::Cancelled;
    }

    /// Parsed scheduled time, if present and well-formed.
    pub fn scheduled_time(&self) -> Option<DateTime<Utc>> {
        self.scheduled_at.as_deref().and_then(parse_schedule)
    }

    /// Scheduled at or after `now`. Missing or unparseable schedules are never upcoming.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_time().is_some_and(|t| t >= now)
    }

    /// Scheduled strictly after `now`.
    pub fn is_after(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_time().is_some_and(|t| t > now)
    }
}

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a stored schedule value.
///
/// Accepts RFC 3339, naive date-times (taken as UTC) and bare dates (midnight UTC).
pub fn parse_schedule(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
