//! Free-text command dispatch.
//!
//! A command is lowercased and trimmed, then matched against an ordered route
//! table; the first route whose phrase appears anywhere in the text handles
//! it. Handlers only read from the repository.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::info;

use clinicops_core::ClinicId;

use crate::agent::AgentKind;
use crate::context::AgentContext;
use crate::format::{fixed2, ratio_percent};
use crate::repository::ClinicRepository;
use crate::result::AgentError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum CommandStatus {
    Executed,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    pub command: String,
    pub status: CommandStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub body: CommandBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandBody {
    Analysis {
        analysis: CommandAnalysis,
    },
    Overview {
        #[serde(rename = "clinicOverview")]
        clinic_overview: ClinicOverview,
    },
    AgentsRun {
        message: &'static str,
        #[serde(rename = "agentsRun")]
        agents_run: Vec<AcknowledgedAgent>,
    },
    Unknown {
        error: &'static str,
        #[serde(rename = "availableCommands")]
        available_commands: Vec<&'static str>,
        suggestion: &'static str,
    },
}

/// Handler-specific metrics followed by the canned playbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandAnalysis {
    #[serde(flatten)]
    pub metrics: Map<String, Value>,
    pub strategy: Vec<&'static str>,
    pub expected_impact: String,
    pub next_action: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicOverview {
    pub appointments: usize,
    pub cases: usize,
    pub invoices: usize,
    pub revenue: String,
    /// Paid invoice count over invoice count, without a `%` suffix.
    pub collection_rate: String,
    pub inventory_items: usize,
    pub low_stock_items: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcknowledgedAgent {
    pub agent: &'static str,
    pub status: &'static str,
}

type Handler<R> = fn(&CommandCenter<R>, &ClinicId) -> Result<CommandResult, AgentError>;

struct CommandRoute<R> {
    phrase: &'static str,
    handler: Handler<R>,
}

pub struct CommandCenter<R> {
    ctx: AgentContext<R>,
    routes: Vec<CommandRoute<R>>,
}

impl<R: ClinicRepository> CommandCenter<R> {
    pub fn new(ctx: AgentContext<R>) -> Self {
        let routes: Vec<CommandRoute<R>> = vec![
            CommandRoute { phrase: "reduce cancellations", handler: Self::reduce_cancellations },
            CommandRoute { phrase: "increase revenue", handler: Self::increase_revenue },
            CommandRoute { phrase: "optimize inventory", handler: Self::optimize_inventory },
            CommandRoute { phrase: "improve appointments", handler: Self::improve_appointments },
            CommandRoute { phrase: "boost collection", handler: Self::boost_collection },
            CommandRoute { phrase: "check status", handler: Self::check_status },
            CommandRoute { phrase: "run all agents", handler: Self::run_all_agents },
        ];
        Self { ctx, routes }
    }

    /// Phrases in match priority order.
    pub fn available_commands(&self) -> Vec<&'static str> {
        self.routes.iter().map(|r| r.phrase).collect()
    }

    /// The phrase that would handle `command`, if any.
    pub fn resolve(&self, command: &str) -> Option<&'static str> {
        self.route_for(command).map(|r| r.phrase)
    }

    pub fn execute(
        &self,
        clinic_id: &ClinicId,
        command: &str,
    ) -> Result<CommandResult, AgentError> {
        info!(clinic = %clinic_id, command, "executing command");
        match self.route_for(command) {
            Some(route) => (route.handler)(self, clinic_id),
            None => {
                info!(clinic = %clinic_id, command, "command not recognized");
                Ok(self.unknown(command))
            }
        }
    }

    fn route_for(&self, command: &str) -> Option<&CommandRoute<R>> {
        let normalized = command.trim().to_lowercase();
        self.routes.iter().find(|r| normalized.contains(r.phrase))
    }

    fn executed(&self, title: &str, body: CommandBody) -> CommandResult {
        CommandResult {
            command: title.to_string(),
            status: CommandStatus::Executed,
            timestamp: self.ctx.now(),
            body,
        }
    }

    fn unknown(&self, command: &str) -> CommandResult {
        CommandResult {
            command: command.to_string(),
            status: CommandStatus::Unknown,
            timestamp: self.ctx.now(),
            body: CommandBody::Unknown {
                error: "Command not recognized",
                available_commands: self.available_commands(),
                suggestion: "Try one of the available commands listed above",
            },
        }
    }

    fn reduce_cancellations(&self, clinic_id: &ClinicId) -> Result<CommandResult, AgentError> {
        let now = self.ctx.now();
        let upcoming = self
            .ctx
            .repo
            .appointments_by_clinic(clinic_id)?
            .iter()
            .filter(|a| a.is_after(now))
            .count();

        Ok(self.executed(
            "Reduce Cancellations",
            CommandBody::Analysis {
                analysis: CommandAnalysis {
                    metrics: metrics([("totalUpcomingAppointments", json!(upcoming))]),
                    strategy: vec![
                        "Sending appointment reminders 24 hours before scheduled time",
                        "Creating automated WhatsApp notifications",
                        "Flagging high-risk cancellations based on patient history",
                        "Offering rescheduling for conflicting appointments",
                    ],
                    expected_impact: "Reduce no-show rate by 15-20%".into(),
                    next_action: "Monitor cancellation rate over next 30 days",
                },
            },
        ))
    }

    fn increase_revenue(&self, clinic_id: &ClinicId) -> Result<CommandResult, AgentError> {
        let cases = self.ctx.repo.cases_by_clinic(clinic_id)?;
        let invoices = self.ctx.repo.invoices_by_clinic(clinic_id)?;
        let paid = invoices.iter().filter(|i| i.paid).count();

        Ok(self.executed(
            "Increase Revenue",
            CommandBody::Analysis {
                analysis: CommandAnalysis {
                    metrics: metrics([
                        ("totalCases", json!(cases.len())),
                        ("totalInvoices", json!(invoices.len())),
                        ("paidInvoices", json!(paid)),
                    ]),
                    strategy: vec![
                        "Accelerate case-to-invoice conversion",
                        "Implement automated payment reminders",
                        "Optimize treatment bundling",
                        "Track high-value procedures",
                    ],
                    expected_impact: "$500-$1000 additional monthly revenue".into(),
                    next_action: "Focus on unpaid invoices collection",
                },
            },
        ))
    }

    fn optimize_inventory(&self, clinic_id: &ClinicId) -> Result<CommandResult, AgentError> {
        let items = self.ctx.repo.inventory_by_clinic(clinic_id)?;
        let low = items
            .iter()
            .filter(|i| i.is_below(self.ctx.config.low_stock_threshold))
            .count();

        Ok(self.executed(
            "Optimize Inventory",
            CommandBody::Analysis {
                analysis: CommandAnalysis {
                    metrics: metrics([
                        ("totalItems", json!(items.len())),
                        ("lowStockItems", json!(low)),
                    ]),
                    strategy: vec![
                        "Creating purchase orders for low stock items",
                        "Consolidating supplier orders to reduce costs",
                        "Implementing inventory tracking alerts",
                        "Optimizing reorder points based on usage",
                    ],
                    expected_impact: "Reduce holding costs by 10-15%, eliminate stockouts".into(),
                    next_action: "Monitor POs and update inventory status",
                },
            },
        ))
    }

    fn improve_appointments(&self, clinic_id: &ClinicId) -> Result<CommandResult, AgentError> {
        let total = self.ctx.repo.appointments_by_clinic(clinic_id)?.len();

        Ok(self.executed(
            "Improve Appointments",
            CommandBody::Analysis {
                analysis: CommandAnalysis {
                    metrics: metrics([("totalAppointments", json!(total))]),
                    strategy: vec![
                        "Analyzing peak booking times",
                        "Identifying scheduling conflicts",
                        "Recommending optimal slot availability",
                        "Suggesting appointment bundling",
                    ],
                    expected_impact: "20% increase in appointment utilization".into(),
                    next_action: "Review scheduling patterns weekly",
                },
            },
        ))
    }

    fn boost_collection(&self, clinic_id: &ClinicId) -> Result<CommandResult, AgentError> {
        let invoices = self.ctx.repo.invoices_by_clinic(clinic_id)?;
        let unpaid: Vec<_> = invoices.iter().filter(|i| !i.paid).collect();
        let total_unpaid = fixed2(unpaid.iter().map(|i| i.amount).sum());

        Ok(self.executed(
            "Boost Collection",
            CommandBody::Analysis {
                analysis: CommandAnalysis {
                    metrics: metrics([
                        ("unpaidInvoices", json!(unpaid.len())),
                        ("totalUnpaidAmount", json!(total_unpaid)),
                    ]),
                    strategy: vec![
                        "Sending automated payment reminders",
                        "Offering online payment options",
                        "Implementing dunning management",
                        "Creating payment plans for large amounts",
                    ],
                    expected_impact: format!("Recover ${total_unpaid} within 30 days"),
                    next_action: "Monitor payment status daily",
                },
            },
        ))
    }

    fn check_status(&self, clinic_id: &ClinicId) -> Result<CommandResult, AgentError> {
        let repo = &self.ctx.repo;
        let appointments = repo.appointments_by_clinic(clinic_id)?;
        let cases = repo.cases_by_clinic(clinic_id)?;
        let invoices = repo.invoices_by_clinic(clinic_id)?;
        let items = repo.inventory_by_clinic(clinic_id)?;

        let paid = invoices.iter().filter(|i| i.paid).count();
        let overview = ClinicOverview {
            appointments: appointments.len(),
            cases: cases.len(),
            invoices: invoices.len(),
            revenue: fixed2(invoices.iter().map(|i| i.amount).sum()),
            collection_rate: ratio_percent(paid as f64, invoices.len() as f64),
            inventory_items: items.len(),
            low_stock_items: items
                .iter()
                .filter(|i| i.is_below(self.ctx.config.low_stock_threshold))
                .count(),
        };

        Ok(self.executed(
            "Check Status",
            CommandBody::Overview {
                clinic_overview: overview,
            },
        ))
    }

    /// Canned acknowledgment; does not run any agent.
    fn run_all_agents(&self, _clinic_id: &ClinicId) -> Result<CommandResult, AgentError> {
        Ok(self.executed(
            "Run All Agents",
            CommandBody::AgentsRun {
                message: "All agents executed successfully",
                agents_run: AgentKind::ALL
                    .iter()
                    .map(|k| AcknowledgedAgent {
                        agent: k.type_name(),
                        status: "completed",
                    })
                    .collect(),
            },
        ))
    }
}

fn metrics<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}
