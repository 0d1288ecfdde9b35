use std::collections::BTreeMap;

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;
use tracing::{error, info};

use clinicops_clinic::{Appointment, AppointmentStatus};
use clinicops_core::{AppointmentId, ClinicId};

use crate::agent::{Agent, AgentKind};
use crate::context::AgentContext;
use crate::format::ratio_percent;
use crate::repository::ClinicRepository;
use crate::result::AgentError;

const NO_DATA: &str = "No data";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentReport {
    pub agent: &'static str,
    pub timestamp: DateTime<Utc>,
    pub clinic_id: ClinicId,
    pub analysis: SlotAnalysis,
    pub appointments: AppointmentSummary,
    pub next_run: DateTime<Utc>,
}

/// Occupancy against the weekly slot capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAnalysis {
    pub total_slots: u32,
    pub booked_slots: usize,
    /// Not clamped: overbooking shows up as a negative number.
    pub available_slots: i64,
    pub occupancy_rate: String,
    pub recommendation: &'static str,
    pub peak_time: String,
    pub action: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub total: usize,
    pub upcoming: usize,
    pub completed: usize,
    pub data: Vec<AppointmentListing>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleBucket {
    Upcoming,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentListing {
    pub id: AppointmentId,
    pub patient_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub status: AppointmentStatus,
    pub patient: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub bucket: ScheduleBucket,
}

/// Watches slot occupancy and the busiest booking hour.
pub struct AppointmentAgent<R> {
    ctx: AgentContext<R>,
}

impl<R: ClinicRepository> AppointmentAgent<R> {
    pub fn new(ctx: AgentContext<R>) -> Self {
        Self { ctx }
    }

    fn analyze(&self, clinic_id: &ClinicId) -> Result<AppointmentReport, AgentError> {
        let appointments = self.ctx.repo.appointments_by_clinic(clinic_id)?;
        let now = self.ctx.now();

        let data: Vec<AppointmentListing> = appointments
            .iter()
            .map(|a| listing(a, bucket(a, now)))
            .collect();
        let upcoming = data
            .iter()
            .filter(|l| l.bucket == ScheduleBucket::Upcoming)
            .count();

        let analysis = self.analyze_slots(&appointments);
        info!(
            agent = AgentKind::Appointment.display_name(),
            clinic = %clinic_id,
            booked = analysis.booked_slots,
            available = analysis.available_slots,
            occupancy = %analysis.occupancy_rate,
            peak = %analysis.peak_time,
            "slot analysis"
        );

        Ok(AppointmentReport {
            agent: AgentKind::Appointment.display_name(),
            timestamp: now,
            clinic_id: clinic_id.clone(),
            analysis,
            appointments: AppointmentSummary {
                total: data.len(),
                upcoming,
                completed: data.len() - upcoming,
                data,
            },
            next_run: self.ctx.next_run(now),
        })
    }

    fn analyze_slots(&self, appointments: &[Appointment]) -> SlotAnalysis {
        let cfg = &self.ctx.config;
        let total_slots = cfg.weekly_slot_capacity;
        let booked_slots = appointments.len();
        let available_slots = i64::from(total_slots) - booked_slots as i64;

        SlotAnalysis {
            total_slots,
            booked_slots,
            available_slots,
            occupancy_rate: format!(
                "{}%",
                ratio_percent(booked_slots as f64, f64::from(total_slots))
            ),
            recommendation: if available_slots > cfg.availability_margin {
                "Good availability"
            } else {
                "Getting full, consider adding slots"
            },
            peak_time: peak_time(appointments),
            action: "Monitoring slots for optimal booking suggestions",
        }
    }
}

impl<R: ClinicRepository> Agent for AppointmentAgent<R> {
    type Report = AppointmentReport;

    fn kind(&self) -> AgentKind {
        AgentKind::Appointment
    }

    fn run(&self, clinic_id: &ClinicId) -> Result<AppointmentReport, AgentError> {
        let agent = AgentKind::Appointment.display_name();
        info!(agent, clinic = %clinic_id, "agent run started");
        self.analyze(clinic_id).inspect_err(|e| {
            error!(agent, clinic = %clinic_id, error = %e, "agent run failed");
        })
    }
}

fn bucket(a: &Appointment, now: DateTime<Utc>) -> ScheduleBucket {
    if a.is_upcoming(now) {
        ScheduleBucket::Upcoming
    } else {
        ScheduleBucket::Completed
    }
}

fn listing(a: &Appointment, bucket: ScheduleBucket) -> AppointmentListing {
    AppointmentListing {
        id: a.id.clone(),
        patient_name: a.patient_name.clone(),
        phone: a.phone.clone(),
        email: a.email.clone(),
        date: a.scheduled_at.clone(),
        time: a.time.clone(),
        status: a.status,
        patient: a.patient.clone(),
        created_at: a.created_at,
        bucket,
    }
}

/// Busiest hour of day (UTC) as `"H:00 (N appointments)"`.
///
/// Ties resolve to the earliest hour. Appointments without a parseable
/// schedule are not bucketed.
fn peak_time(appointments: &[Appointment]) -> String {
    let mut by_hour: BTreeMap<u32, usize> = BTreeMap::new();
    for at in appointments.iter().filter_map(Appointment::scheduled_time) {
        *by_hour.entry(at.hour()).or_default() += 1;
    }

    let mut peak: Option<(u32, usize)> = None;
    for (hour, count) in by_hour {
        match peak {
            Some((_, best)) if count <= best => {}
            _ => peak = Some((hour, count)),
        }
    }

    match peak {
        Some((hour, count)) => format!("{hour}:00 ({count} appointments)"),
        None => NO_DATA.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryError;
    use crate::testing::{appointment, clinic_id, harness};

    #[test]
    fn empty_clinic_reports_zero_occupancy_and_no_peak() {
        let h = harness();
        let report = AppointmentAgent::new(h.ctx).run(&clinic_id()).unwrap();

        assert_eq!(report.analysis.occupancy_rate, "0.00%");
        assert_eq!(report.analysis.peak_time, "No data");
        assert_eq!(report.analysis.available_slots, 40);
        assert_eq!(report.analysis.recommendation, "Good availability");
        assert_eq!(report.appointments.total, 0);
    }

    #[test]
    fn partitions_upcoming_and_completed() {
        let h = harness();
        h.repo.push_appointment(appointment("a1", Some("2025-06-03T09:00:00Z")));
        h.repo.push_appointment(appointment("a2", Some("2025-06-02T12:00:00Z")));
        h.repo.push_appointment(appointment("a3", Some("2025-05-30T09:00:00Z")));
        h.repo.push_appointment(appointment("a4", Some("not a date")));
        h.repo.push_appointment(appointment("a5", None));

        let report = AppointmentAgent::new(h.ctx).run(&clinic_id()).unwrap();

        assert_eq!(report.appointments.total, 5);
        assert_eq!(report.appointments.upcoming, 2);
        assert_eq!(report.appointments.completed, 3);
        let buckets: Vec<_> = report.appointments.data.iter().map(|l| l.bucket).collect();
        assert_eq!(
            buckets,
            [
                ScheduleBucket::Upcoming,
                ScheduleBucket::Upcoming,
                ScheduleBucket::Completed,
                ScheduleBucket::Completed,
                ScheduleBucket::Completed,
            ]
        );
    }

    #[test]
    fn peak_hour_prefers_earliest_on_tie() {
        let h = harness();
        for (id, at) in [
            ("a1", "2025-06-03T14:00:00Z"),
            ("a2", "2025-06-04T14:30:00Z"),
            ("a3", "2025-06-03T09:00:00Z"),
            ("a4", "2025-06-05T09:45:00Z"),
            ("a5", "2025-06-05T16:00:00Z"),
        ] {
            h.repo.push_appointment(appointment(id, Some(at)));
        }

        let report = AppointmentAgent::new(h.ctx).run(&clinic_id()).unwrap();
        assert_eq!(report.analysis.peak_time, "9:00 (2 appointments)");
    }

    #[test]
    fn peak_hour_picks_strict_maximum() {
        let h = harness();
        for (id, at) in [
            ("a1", "2025-06-03T08:00:00Z"),
            ("a2", "2025-06-03T15:00:00Z"),
            ("a3", "2025-06-04T15:10:00Z"),
        ] {
            h.repo.push_appointment(appointment(id, Some(at)));
        }
        let report = AppointmentAgent::new(h.ctx).run(&clinic_id()).unwrap();
        assert_eq!(report.analysis.peak_time, "15:00 (2 appointments)");
    }

    #[test]
    fn overbooking_goes_negative_and_recommends_more_slots() {
        let h = harness();
        for n in 0..45 {
            h.repo
                .push_appointment(appointment(&format!("a{n}"), Some("2025-06-03T10:00:00Z")));
        }

        let report = AppointmentAgent::new(h.ctx).run(&clinic_id()).unwrap();
        assert_eq!(report.analysis.available_slots, -5);
        assert_eq!(report.analysis.occupancy_rate, "112.50%");
        assert_eq!(
            report.analysis.recommendation,
            "Getting full, consider adding slots"
        );
    }

    #[test]
    fn exactly_ten_available_is_getting_full() {
        let h = harness();
        for n in 0..30 {
            h.repo.push_appointment(appointment(&format!("a{n}"), None));
        }
        let report = AppointmentAgent::new(h.ctx).run(&clinic_id()).unwrap();
        assert_eq!(report.analysis.available_slots, 10);
        assert_eq!(
            report.analysis.recommendation,
            "Getting full, consider adding slots"
        );
        // Nothing parseable to bucket by hour.
        assert_eq!(report.analysis.peak_time, "No data");
    }

    #[test]
    fn capacity_is_configurable() {
        let h = harness();
        let mut cfg = h.ctx.config.clone();
        cfg.weekly_slot_capacity = 8;
        h.repo.push_appointment(appointment("a1", None));
        h.repo.push_appointment(appointment("a2", None));

        let report = AppointmentAgent::new(h.ctx.with_config(cfg))
            .run(&clinic_id())
            .unwrap();
        assert_eq!(report.analysis.total_slots, 8);
        assert_eq!(report.analysis.occupancy_rate, "25.00%");
    }

    #[test]
    fn serializes_with_contract_field_names() {
        let h = harness();
        h.repo.push_appointment(appointment("a1", Some("2025-06-03T09:00:00Z")));
        let report = AppointmentAgent::new(h.ctx).run(&clinic_id()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["agent"], "Appointment Agent");
        assert_eq!(json["clinicId"], "clinic-1");
        assert_eq!(json["analysis"]["totalSlots"], 40);
        assert_eq!(json["analysis"]["occupancyRate"], "2.50%");
        assert_eq!(json["appointments"]["data"][0]["type"], "upcoming");
        assert_eq!(json["appointments"]["data"][0]["date"], "2025-06-03T09:00:00Z");
        assert_eq!(json["nextRun"], "2025-06-03T12:00:00Z");
    }

    #[test]
    fn read_failure_propagates() {
        let h = harness();
        h.repo.fail_reads();
        let err = AppointmentAgent::new(h.ctx).run(&clinic_id()).unwrap_err();
        assert!(matches!(
            err,
            AgentError::Repository(RepositoryError::Unavailable(_))
        ));
    }
}
