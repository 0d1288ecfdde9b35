use serde::Serialize;
use thiserror::Error;

use clinicops_core::ClinicId;

use crate::agent::AgentKind;
use crate::appointment::AppointmentReport;
use crate::case::CaseReport;
use crate::inventory::InventoryReport;
use crate::repository::RepositoryError;
use crate::revenue::RevenueReport;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("clinic {0} is outside this scheduler's scope")]
    ScopeViolation(ClinicId),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Output of any one agent run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AgentReport {
    Appointment(AppointmentReport),
    Revenue(RevenueReport),
    Case(CaseReport),
    Inventory(InventoryReport),
}

impl AgentReport {
    pub fn kind(&self) -> AgentKind {
        match self {
            AgentReport::Appointment(_) => AgentKind::Appointment,
            AgentReport::Revenue(_) => AgentKind::Revenue,
            AgentReport::Case(_) => AgentKind::Case,
            AgentReport::Inventory(_) => AgentKind::Inventory,
        }
    }
}

/// Failure payload surfaced to triggers instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentFailure {
    pub agent: &'static str,
    pub status: &'static str,
    pub error: String,
}

impl AgentFailure {
    pub fn new(kind: AgentKind, error: &AgentError) -> Self {
        Self {
            agent: kind.type_name(),
            status: "error",
            error: error.to_string(),
        }
    }
}

/// What a trigger (HTTP, booking chain, schedule) gets back for one agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AgentOutcome {
    Completed(AgentReport),
    Failed(AgentFailure),
}

impl AgentOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, AgentOutcome::Completed(_))
    }

    pub fn report(&self) -> Option<&AgentReport> {
        match self {
            AgentOutcome::Completed(r) => Some(r),
            AgentOutcome::Failed(_) => None,
        }
    }
}

/// Outcome of running every agent for one clinic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllAgentsOutcome {
    pub appointment: AgentOutcome,
    pub revenue: AgentOutcome,
    pub case: AgentOutcome,
    pub inventory: AgentOutcome,
}
