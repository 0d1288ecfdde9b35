use std::sync::Mutex;

use tracing::info;

use clinicops_agents::AgentReport;
use clinicops_core::ClinicId;

/// Destination for reports produced outside a request (scheduled runs).
pub trait AgentReportSink: Send + Sync + 'static {
    fn emit(&self, clinic_id: &ClinicId, report: AgentReport);
}

/// In-memory sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAgentReportSink {
    inner: Mutex<Vec<(ClinicId, AgentReport)>>,
}

impl InMemoryAgentReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<(ClinicId, AgentReport)> {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AgentReportSink for InMemoryAgentReportSink {
    fn emit(&self, clinic_id: &ClinicId, report: AgentReport) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.push((clinic_id.clone(), report));
        }
    }
}

/// Records each report as a log line and drops it.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogReportSink;

impl AgentReportSink for LogReportSink {
    fn emit(&self, clinic_id: &ClinicId, report: AgentReport) {
        info!(agent = report.kind().type_name(), clinic = %clinic_id, "scheduled report ready");
    }
}
