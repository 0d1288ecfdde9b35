use tracing::{info, warn};

use clinicops_core::ClinicId;

use crate::agent::AgentKind;
use crate::appointment::AppointmentAgent;
use crate::case::CaseAgent;
use crate::command_center::CommandCenter;
use crate::context::AgentContext;
use crate::inventory::InventoryAgent;
use crate::repository::ClinicRepository;
use crate::result::{AgentError, AgentFailure, AgentOutcome, AgentReport, AllAgentsOutcome};
use crate::revenue::RevenueAgent;
use crate::scheduler::{AgentScheduler, ClinicScope, LocalAgentScheduler};

/// The four agents plus the command center over one shared context.
///
/// This is what every trigger (HTTP handlers, booking chain, daily runner)
/// holds; agents are stateless, so one set serves all clinics in scope.
pub struct AgentSet<R> {
    ctx: AgentContext<R>,
    scheduler: LocalAgentScheduler,
    appointment: AppointmentAgent<R>,
    revenue: RevenueAgent<R>,
    case: CaseAgent<R>,
    inventory: InventoryAgent<R>,
    commands: CommandCenter<R>,
}

impl<R: ClinicRepository> AgentSet<R> {
    pub fn new(ctx: AgentContext<R>) -> Self {
        Self::with_scope(ctx, ClinicScope::Any)
    }

    pub fn with_scope(ctx: AgentContext<R>, scope: ClinicScope) -> Self {
        Self {
            scheduler: LocalAgentScheduler::new(scope),
            appointment: AppointmentAgent::new(ctx.clone()),
            revenue: RevenueAgent::new(ctx.clone()),
            case: CaseAgent::new(ctx.clone()),
            inventory: InventoryAgent::new(ctx.clone()),
            commands: CommandCenter::new(ctx.clone()),
            ctx,
        }
    }

    pub fn context(&self) -> &AgentContext<R> {
        &self.ctx
    }

    pub fn command_center(&self) -> &CommandCenter<R> {
        &self.commands
    }

    pub fn run(&self, kind: AgentKind, clinic_id: &ClinicId) -> Result<AgentReport, AgentError> {
        let s = &self.scheduler;
        Ok(match kind {
            AgentKind::Appointment => {
                AgentReport::Appointment(s.run(&self.appointment, clinic_id)?)
            }
            AgentKind::Revenue => AgentReport::Revenue(s.run(&self.revenue, clinic_id)?),
            AgentKind::Case => AgentReport::Case(s.run(&self.case, clinic_id)?),
            AgentKind::Inventory => AgentReport::Inventory(s.run(&self.inventory, clinic_id)?),
        })
    }

    /// Like [`AgentSet::run`], but a failure becomes an error payload instead
    /// of propagating.
    pub fn run_outcome(&self, kind: AgentKind, clinic_id: &ClinicId) -> AgentOutcome {
        match self.run(kind, clinic_id) {
            Ok(report) => AgentOutcome::Completed(report),
            Err(e) => {
                warn!(
                    agent = kind.type_name(),
                    clinic = %clinic_id,
                    error = %e,
                    "agent outcome failed"
                );
                AgentOutcome::Failed(AgentFailure::new(kind, &e))
            }
        }
    }

    /// Runs every agent in order: appointment, revenue, case, inventory.
    pub fn run_all(&self, clinic_id: &ClinicId) -> AllAgentsOutcome {
        info!(clinic = %clinic_id, "running all agents");
        AllAgentsOutcome {
            appointment: self.run_outcome(AgentKind::Appointment, clinic_id),
            revenue: self.run_outcome(AgentKind::Revenue, clinic_id),
            case: self.run_outcome(AgentKind::Case, clinic_id),
            inventory: self.run_outcome(AgentKind::Inventory, clinic_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinicops_core::Sku;
    use clinicops_inventory::InventoryItem;

    use crate::testing::{appointment, clinic_id, harness};

    #[test]
    fn run_dispatches_by_kind() {
        let h = harness();
        let set = AgentSet::new(h.ctx);
        for kind in AgentKind::ALL {
            let report = set.run(kind, &clinic_id()).unwrap();
            assert_eq!(report.kind(), kind);
        }
    }

    #[test]
    fn run_all_performs_writes() {
        let h = harness();
        h.repo.push_appointment(appointment("a1", None));
        h.repo
            .push_item(InventoryItem::new(clinic_id(), Sku::new("gloves"), 1));

        let outcome = AgentSet::new(h.ctx).run_all(&clinic_id());
        assert!(outcome.appointment.is_completed());
        assert!(outcome.revenue.is_completed());
        assert!(outcome.case.is_completed());
        assert!(outcome.inventory.is_completed());
        assert_eq!(h.repo.cases().len(), 1);
        assert_eq!(h.repo.purchase_orders().len(), 1);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["case"]["agent"], "Case Agent");
        assert_eq!(json["inventory"]["purchaseOrders"][0]["sku"], "gloves");
    }

    #[test]
    fn failures_become_error_payloads() {
        let h = harness();
        h.repo.fail_reads();
        let outcome = AgentSet::new(h.ctx).run_outcome(AgentKind::Revenue, &clinic_id());
        assert!(!outcome.is_completed());

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["agent"], "RevenueAgent");
        assert_eq!(json["status"], "error");
        assert!(json["error"].as_str().unwrap().contains("injected read failure"));
    }

    #[test]
    fn scoped_set_rejects_other_clinics() {
        let h = harness();
        let set = AgentSet::with_scope(h.ctx, ClinicScope::Clinic(clinic_id()));
        let err = set
            .run(AgentKind::Case, &ClinicId::new("clinic-2"))
            .unwrap_err();
        assert!(matches!(err, AgentError::ScopeViolation(_)));
    }
}
