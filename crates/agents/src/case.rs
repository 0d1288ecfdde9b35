use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use clinicops_clinic::{Appointment, Case, CaseStatus};
use clinicops_core::{AppointmentId, CaseId, ClinicId};

use crate::agent::{Agent, AgentKind};
use crate::context::AgentContext;
use crate::repository::ClinicRepository;
use crate::result::AgentError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseReport {
    pub agent: &'static str,
    pub timestamp: DateTime<Utc>,
    pub clinic_id: ClinicId,
    pub cases_created: Vec<CreatedCase>,
    pub treatment_verification: TreatmentVerification,
    pub next_run: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCase {
    pub case_id: CaseId,
    pub appointment_id: AppointmentId,
    pub patient: Option<String>,
    pub status: CaseStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentVerification {
    pub total_cases: usize,
    pub completed_treatments: usize,
    pub pending_treatments: usize,
    pub treatment_status: Vec<TreatmentStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentStatus {
    pub case_id: CaseId,
    pub patient: Option<String>,
    pub status: CaseStatus,
}

/// Opens a case for every appointment that lacks one and summarizes treatment
/// progress.
///
/// Re-running without new appointments creates nothing. Two concurrent runs
/// for one clinic may both open a case for the same appointment.
pub struct CaseAgent<R> {
    ctx: AgentContext<R>,
}

impl<R: ClinicRepository> CaseAgent<R> {
    pub fn new(ctx: AgentContext<R>) -> Self {
        Self { ctx }
    }

    fn analyze(&self, clinic_id: &ClinicId) -> Result<CaseReport, AgentError> {
        let appointments = self.ctx.repo.appointments_by_clinic(clinic_id)?;
        let existing = self.ctx.repo.cases_by_clinic(clinic_id)?;
        let now = self.ctx.now();

        let cases_created = self.open_missing_cases(clinic_id, &appointments, &existing, now);
        let treatment_verification = verify_treatments(&existing);

        info!(
            agent = AgentKind::Case.display_name(),
            clinic = %clinic_id,
            created = cases_created.len(),
            total_cases = treatment_verification.total_cases,
            "case sync"
        );

        Ok(CaseReport {
            agent: AgentKind::Case.display_name(),
            timestamp: now,
            clinic_id: clinic_id.clone(),
            cases_created,
            treatment_verification,
            next_run: self.ctx.next_run(now),
        })
    }

    fn open_missing_cases(
        &self,
        clinic_id: &ClinicId,
        appointments: &[Appointment],
        existing: &[Case],
        now: DateTime<Utc>,
    ) -> Vec<CreatedCase> {
        let mut covered: HashSet<&AppointmentId> = existing
            .iter()
            .filter_map(|c| c.appointment_id.as_ref())
            .collect();

        let mut created = Vec::new();
        for appt in appointments {
            if !covered.insert(&appt.id) {
                continue;
            }

            let case = Case::open(
                self.ctx.ids.case_id(),
                clinic_id.clone(),
                appt.id.clone(),
                appt.patient.clone(),
                now,
            );
            let summary = CreatedCase {
                case_id: case.id.clone(),
                appointment_id: appt.id.clone(),
                patient: case.patient.clone(),
                status: case.status,
            };

            match self.ctx.repo.add_case(case) {
                Ok(()) => {
                    info!(case = %summary.case_id, appointment = %appt.id, "case opened");
                    created.push(summary);
                }
                Err(e) => {
                    warn!(appointment = %appt.id, error = %e, "failed to open case; skipping");
                }
            }
        }
        created
    }
}

impl<R: ClinicRepository> Agent for CaseAgent<R> {
    type Report = CaseReport;

    fn kind(&self) -> AgentKind {
        AgentKind::Case
    }

    fn run(&self, clinic_id: &ClinicId) -> Result<CaseReport, AgentError> {
        let agent = AgentKind::Case.display_name();
        info!(agent, clinic = %clinic_id, "agent run started");
        self.analyze(clinic_id).inspect_err(|e| {
            error!(agent, clinic = %clinic_id, error = %e, "agent run failed");
        })
    }
}

fn verify_treatments(cases: &[Case]) -> TreatmentVerification {
    let completed_treatments = cases.iter().filter(|c| c.status.is_completed()).count();
    TreatmentVerification {
        total_cases: cases.len(),
        completed_treatments,
        pending_treatments: cases.len() - completed_treatments,
        treatment_status: cases
            .iter()
            .map(|c| TreatmentStatus {
                case_id: c.id.clone(),
                patient: c.patient.clone(),
                status: c.status,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{appointment, clinic_id, harness, test_now};

    #[test]
    fn opens_one_case_per_uncovered_appointment() {
        let h = harness();
        h.repo.push_appointment(appointment("a1", None));
        h.repo.push_appointment(appointment("a2", None));
        h.repo.push_case(
            Case::open(
                CaseId::new("existing"),
                clinic_id(),
                AppointmentId::new("a1"),
                Some("patient-a1".into()),
                test_now(),
            )
            .with_status(CaseStatus::Completed),
        );

        let report = CaseAgent::new(h.ctx).run(&clinic_id()).unwrap();
        assert_eq!(report.cases_created.len(), 1);
        let created = &report.cases_created[0];
        assert_eq!(created.case_id.as_str(), "case-1");
        assert_eq!(created.appointment_id.as_str(), "a2");
        assert_eq!(created.patient.as_deref(), Some("patient-a2"));
        assert_eq!(created.status, CaseStatus::Created);

        let stored = h.repo.cases();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].created_at, Some(test_now()));
    }

    #[test]
    fn second_run_creates_nothing() {
        let h = harness();
        h.repo.push_appointment(appointment("a1", None));
        h.repo.push_appointment(appointment("a2", None));
        let agent = CaseAgent::new(h.ctx.clone());

        assert_eq!(agent.run(&clinic_id()).unwrap().cases_created.len(), 2);
        let second = agent.run(&clinic_id()).unwrap();
        assert!(second.cases_created.is_empty());
        assert_eq!(h.repo.cases().len(), 2);
        assert_eq!(second.treatment_verification.total_cases, 2);
    }

    #[test]
    fn verification_uses_cases_read_before_creation() {
        let h = harness();
        h.repo.push_appointment(appointment("a1", None));
        h.repo.push_case(
            Case::open(
                CaseId::new("c0"),
                clinic_id(),
                AppointmentId::new("a0"),
                None,
                test_now(),
            )
            .with_status(CaseStatus::InProgress),
        );

        let report = CaseAgent::new(h.ctx).run(&clinic_id()).unwrap();
        let v = &report.treatment_verification;
        assert_eq!(v.total_cases, 1);
        assert_eq!(v.completed_treatments, 0);
        assert_eq!(v.pending_treatments, 1);
        assert_eq!(v.treatment_status[0].case_id.as_str(), "c0");
        assert_eq!(report.cases_created.len(), 1);
    }

    #[test]
    fn failed_case_write_is_skipped() {
        let h = harness();
        h.repo.push_appointment(appointment("a1", None));
        h.repo.push_appointment(appointment("a2", None));
        h.repo
            .reject_cases_for
            .lock()
            .unwrap()
            .insert(AppointmentId::new("a1"));

        let report = CaseAgent::new(h.ctx).run(&clinic_id()).unwrap();
        let created: Vec<_> = report
            .cases_created
            .iter()
            .map(|c| c.appointment_id.as_str())
            .collect();
        assert_eq!(created, ["a2"]);
        assert_eq!(h.repo.cases().len(), 1);
    }

    #[test]
    fn duplicate_appointment_rows_open_a_single_case() {
        let h = harness();
        h.repo.push_appointment(appointment("a1", None));
        h.repo.push_appointment(appointment("a1", None));

        let report = CaseAgent::new(h.ctx).run(&clinic_id()).unwrap();
        assert_eq!(report.cases_created.len(), 1);
    }

    #[test]
    fn report_serializes_camel_case() {
        let h = harness();
        h.repo.push_appointment(appointment("a1", None));
        let report = CaseAgent::new(h.ctx).run(&clinic_id()).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["agent"], "Case Agent");
        assert_eq!(json["casesCreated"][0]["appointmentId"], "a1");
        assert_eq!(json["casesCreated"][0]["status"], "created");
        assert_eq!(json["treatmentVerification"]["totalCases"], 0);
    }

    #[test]
    fn read_failure_aborts_run() {
        let h = harness();
        h.repo.fail_reads();
        let err = CaseAgent::new(h.ctx).run(&clinic_id()).unwrap_err();
        assert!(matches!(err, AgentError::Repository(_)));
    }
}
