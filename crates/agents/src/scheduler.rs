use clinicops_core::ClinicId;

use crate::agent::Agent;
use crate::result::AgentError;

/// Clinic scope for execution.
///
/// - `Any`: run agents for any clinic (shared workers, the HTTP surface).
/// - `Clinic`: only accept runs for the given clinic (single-clinic worker).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClinicScope {
    #[default]
    Any,
    Clinic(ClinicId),
}

impl ClinicScope {
    pub fn allows(&self, clinic_id: &ClinicId) -> bool {
        match self {
            ClinicScope::Any => true,
            ClinicScope::Clinic(c) => c == clinic_id,
        }
    }
}

/// Executes agents on behalf of a trigger, enforcing its clinic scope first.
pub trait AgentScheduler: Send + Sync + 'static {
    fn scope(&self) -> &ClinicScope;

    fn run<A: Agent>(&self, agent: &A, clinic_id: &ClinicId) -> Result<A::Report, AgentError> {
        if !self.scope().allows(clinic_id) {
            return Err(AgentError::ScopeViolation(clinic_id.clone()));
        }
        agent.run(clinic_id)
    }
}

/// Runs agents immediately on the calling thread.
#[derive(Debug, Clone, Default)]
pub struct LocalAgentScheduler {
    scope: ClinicScope,
}

impl LocalAgentScheduler {
    pub fn new(scope: ClinicScope) -> Self {
        Self { scope }
    }

    pub fn for_clinic(clinic_id: ClinicId) -> Self {
        Self::new(ClinicScope::Clinic(clinic_id))
    }
}

impl AgentScheduler for LocalAgentScheduler {
    fn scope(&self) -> &ClinicScope {
        &self.scope
    }
}
