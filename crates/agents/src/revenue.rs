use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use clinicops_clinic::Clinic;
use clinicops_core::{ClinicId, InvoiceId};
use clinicops_invoicing::Invoice;

use crate::agent::{Agent, AgentKind};
use crate::context::AgentContext;
use crate::format::{fixed2, ratio_percent};
use crate::repository::ClinicRepository;
use crate::result::AgentError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub agent: &'static str,
    pub timestamp: DateTime<Utc>,
    pub clinic_id: ClinicId,
    pub analysis: RevenueAnalysis,
    pub notified: Vec<PaymentReminder>,
    pub next_run: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueAnalysis {
    pub total_invoices: usize,
    pub paid_invoices: usize,
    pub unpaid_invoices: usize,
    pub total_amount: String,
    pub paid_amount: String,
    pub unpaid_amount: String,
    pub collection_rate: String,
    pub recommendation: &'static str,
    pub action: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    NotificationSent,
}

/// One reminder per unpaid invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReminder {
    pub invoice_id: InvoiceId,
    pub amount: f64,
    pub days_overdue: i64,
    pub status: ReminderStatus,
}

/// Tracks collections and nudges patients with unpaid invoices.
///
/// Never mutates invoices.
pub struct RevenueAgent<R> {
    ctx: AgentContext<R>,
}

impl<R: ClinicRepository> RevenueAgent<R> {
    pub fn new(ctx: AgentContext<R>) -> Self {
        Self { ctx }
    }

    fn analyze(&self, clinic_id: &ClinicId) -> Result<RevenueReport, AgentError> {
        let invoices = self.ctx.repo.invoices_by_clinic(clinic_id)?;
        let clinic = self.ctx.repo.get_clinic(clinic_id)?;
        let now = self.ctx.now();

        let analysis = analyze_revenue(&invoices, self.ctx.config.unpaid_escalation_count);
        let notified = self.remind_unpaid(&invoices, clinic.as_ref(), now);

        info!(
            agent = AgentKind::Revenue.display_name(),
            clinic = %clinic_id,
            total = %analysis.total_amount,
            unpaid = %analysis.unpaid_amount,
            collection_rate = %analysis.collection_rate,
            notified = notified.len(),
            "revenue analysis"
        );

        Ok(RevenueReport {
            agent: AgentKind::Revenue.display_name(),
            timestamp: now,
            clinic_id: clinic_id.clone(),
            analysis,
            notified,
            next_run: self.ctx.next_run(now),
        })
    }

    fn remind_unpaid(
        &self,
        invoices: &[Invoice],
        clinic: Option<&Clinic>,
        now: DateTime<Utc>,
    ) -> Vec<PaymentReminder> {
        let whatsapp = clinic.and_then(Clinic::whatsapp);

        invoices
            .iter()
            .filter(|i| !i.paid)
            .map(|invoice| {
                if let Some(to) = whatsapp {
                    let message = format!(
                        "Invoice {} for ${} is pending. Please pay.",
                        invoice.id, invoice.amount
                    );
                    self.ctx.notifier.send_whatsapp(to, &message);
                }
                PaymentReminder {
                    invoice_id: invoice.id.clone(),
                    amount: invoice.amount,
                    days_overdue: invoice.days_overdue(now),
                    status: ReminderStatus::NotificationSent,
                }
            })
            .collect()
    }
}

impl<R: ClinicRepository> Agent for RevenueAgent<R> {
    type Report = RevenueReport;

    fn kind(&self) -> AgentKind {
        AgentKind::Revenue
    }

    fn run(&self, clinic_id: &ClinicId) -> Result<RevenueReport, AgentError> {
        let agent = AgentKind::Revenue.display_name();
        info!(agent, clinic = %clinic_id, "agent run started");
        self.analyze(clinic_id).inspect_err(|e| {
            error!(agent, clinic = %clinic_id, error = %e, "agent run failed");
        })
    }
}

fn analyze_revenue(invoices: &[Invoice], escalation_count: usize) -> RevenueAnalysis {
    let paid_invoices = invoices.iter().filter(|i| i.paid).count();
    let unpaid_invoices = invoices.len() - paid_invoices;
    let total: f64 = invoices.iter().map(|i| i.amount).sum();
    let paid: f64 = invoices.iter().filter(|i| i.paid).map(|i| i.amount).sum();

    RevenueAnalysis {
        total_invoices: invoices.len(),
        paid_invoices,
        unpaid_invoices,
        total_amount: fixed2(total),
        paid_amount: fixed2(paid),
        unpaid_amount: fixed2(total - paid),
        collection_rate: format!("{}%", ratio_percent(paid, total)),
        recommendation: if unpaid_invoices > escalation_count {
            "High number of unpaid invoices - escalate follow-up"
        } else {
            "Collection on track"
        },
        action: format!("Sending reminders to {unpaid_invoices} patients with unpaid invoices"),
    }
}
