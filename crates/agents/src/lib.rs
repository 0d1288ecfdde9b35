//! `clinicops-agents`
//!
//! **Responsibility:** the four clinic agents and the command center.
//!
//! - Agents read one clinic's records through [`ClinicRepository`] and return a
//!   structured report.
//! - The case and inventory agents also write (cases, purchase orders); a
//!   failed write is logged and skipped, never fatal to the run.
//! - Time, ids, and outbound notifications are injected via [`AgentContext`].

pub mod agent;
pub mod agent_set;
pub mod appointment;
pub mod case;
pub mod command_center;
pub mod context;
mod format;
pub mod inventory;
pub mod repository;
pub mod result;
pub mod revenue;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use agent::{Agent, AgentKind};
pub use agent_set::AgentSet;
pub use appointment::{AppointmentAgent, AppointmentReport};
pub use case::{CaseAgent, CaseReport};
pub use command_center::{CommandCenter, CommandResult, CommandStatus};
pub use context::{
    AgentConfig, AgentContext, Clock, FixedClock, IdGenerator, LogNotifier, Notifier,
    RecordingNotifier, SequentialIdGenerator, SystemClock, UuidIdGenerator,
};
pub use inventory::{InventoryAgent, InventoryReport};
pub use repository::{ClinicRepository, RepositoryError};
pub use result::{AgentError, AgentFailure, AgentOutcome, AgentReport, AllAgentsOutcome};
pub use revenue::{RevenueAgent, RevenueReport};
pub use scheduler::{AgentScheduler, ClinicScope, LocalAgentScheduler};
