use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use clinicops_agents::{AgentKind, AgentOutcome, AgentSet, ClinicRepository, RepositoryError};
use clinicops_clinic::Appointment;
use clinicops_core::{AppointmentId, ClinicId};

use crate::read_model::InMemoryClinicStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub clinic_id: ClinicId,
    pub patient: String,
    /// Schedule as submitted; defaults to the booking time.
    pub scheduled_at: Option<String>,
}

/// The stored appointment plus what each chained agent produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOutcome {
    pub appointment_id: AppointmentId,
    pub appointment: AgentOutcome,
    pub case: AgentOutcome,
    pub inventory: AgentOutcome,
    pub revenue: AgentOutcome,
}

/// Stores a booked appointment, then runs appointment, case, inventory and
/// revenue agents for the clinic.
///
/// Agent failures stay inside the outcome; only the appointment write can fail
/// the booking.
pub struct BookingChain {
    store: Arc<InMemoryClinicStore>,
    agents: Arc<AgentSet<InMemoryClinicStore>>,
}

impl BookingChain {
    pub fn new(
        store: Arc<InMemoryClinicStore>,
        agents: Arc<AgentSet<InMemoryClinicStore>>,
    ) -> Self {
        Self { store, agents }
    }

    pub fn book(&self, request: BookingRequest) -> Result<BookingOutcome, RepositoryError> {
        let ctx = self.agents.context();
        let now = ctx.clock.now();
        let BookingRequest {
            clinic_id,
            patient,
            scheduled_at,
        } = request;

        let id = AppointmentId::from_uuid(Uuid::now_v7());
        let appointment = Appointment::booked(id.clone(), clinic_id.clone(), patient.clone())
            .scheduled_for(scheduled_at.unwrap_or_else(|| now.to_rfc3339()))
            .created(now);
        self.store.add_appointment(appointment)?;
        info!(clinic = %clinic_id, appointment = %id, "appointment booked");

        let outcome = BookingOutcome {
            appointment: self.agents.run_outcome(AgentKind::Appointment, &clinic_id),
            case: self.agents.run_outcome(AgentKind::Case, &clinic_id),
            inventory: self.agents.run_outcome(AgentKind::Inventory, &clinic_id),
            revenue: self.agents.run_outcome(AgentKind::Revenue, &clinic_id),
            appointment_id: id,
        };

        match self.store.get_clinic(&clinic_id) {
            Ok(Some(clinic)) => {
                if let Some(to) = clinic.whatsapp() {
                    ctx.notifier
                        .send_whatsapp(to, &format!("Appointment confirmed for {patient}"));
                }
            }
            Ok(None) => {}
            Err(e) => warn!(clinic = %clinic_id, error = %e, "skipping booking confirmation"),
        }

        Ok(outcome)
    }
}
