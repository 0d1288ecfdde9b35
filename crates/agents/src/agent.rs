use core::str::FromStr;

use serde::{Deserialize, Serialize};

use clinicops_core::ClinicId;

use crate::result::AgentError;

/// The four domain agents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Appointment,
    Revenue,
    Case,
    Inventory,
}

impl AgentKind {
    pub const ALL: [AgentKind; 4] = [
        AgentKind::Appointment,
        AgentKind::Revenue,
        AgentKind::Case,
        AgentKind::Inventory,
    ];

    /// Human-readable name carried in reports (`"Appointment Agent"`).
    pub fn display_name(self) -> &'static str {
        match self {
            AgentKind::Appointment => "Appointment Agent",
            AgentKind::Revenue => "Revenue Agent",
            AgentKind::Case => "Case Agent",
            AgentKind::Inventory => "Inventory Agent",
        }
    }

    /// Identifier used in failure payloads and acknowledgments (`"AppointmentAgent"`).
    pub fn type_name(self) -> &'static str {
        match self {
            AgentKind::Appointment => "AppointmentAgent",
            AgentKind::Revenue => "RevenueAgent",
            AgentKind::Case => "CaseAgent",
            AgentKind::Inventory => "InventoryAgent",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::Appointment => "appointment",
            AgentKind::Revenue => "revenue",
            AgentKind::Case => "case",
            AgentKind::Inventory => "inventory",
        }
    }
}

impl core::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AgentError::InvalidInput(format!("unknown agent kind: {s}")))
    }
}

/// A clinic-scoped analysis routine.
///
/// Agents are stateless between runs: every report is computed from what the
/// repository returns during `run` plus the injected clock. Some agents also
/// insert records (cases, purchase orders) as part of a run.
pub trait Agent: Send + Sync {
    type Report: Serialize + Send + 'static;

    fn kind(&self) -> AgentKind;

    /// Execute one run for `clinic_id`.
    ///
    /// Repository read failures abort the run and propagate; failures writing a
    /// single derived record are logged and skipped.
    fn run(&self, clinic_id: &ClinicId) -> Result<Self::Report, AgentError>;
}
