use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use clinicops_core::{ClinicId, PurchaseOrderId, Sku};
use clinicops_inventory::InventoryItem;
use clinicops_purchasing::{PurchaseOrder, PurchaseOrderStatus};

use crate::agent::{Agent, AgentKind};
use crate::context::{AgentConfig, AgentContext};
use crate::format::fixed2;
use crate::repository::ClinicRepository;
use crate::result::AgentError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub agent: &'static str,
    pub timestamp: DateTime<Utc>,
    pub clinic_id: ClinicId,
    pub analysis: StockAnalysis,
    pub purchase_orders: Vec<DraftedOrder>,
    pub next_run: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAnalysis {
    pub total_items: usize,
    pub low_stock_items: usize,
    pub out_of_stock_items: usize,
    pub total_inventory_value: String,
    pub low_stock_threshold: u64,
    pub recommendation: &'static str,
    pub items_needing_reorder: Vec<ReorderSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderSuggestion {
    pub sku: Sku,
    pub name: Option<String>,
    pub current_qty: u64,
    pub suggested_qty: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftedOrder {
    pub po_id: PurchaseOrderId,
    pub sku: Sku,
    pub item_name: Option<String>,
    pub quantity: u64,
    pub status: PurchaseOrderStatus,
}

/// Watches stock levels and drafts one purchase order per low-stock item.
pub struct InventoryAgent<R> {
    ctx: AgentContext<R>,
}

impl<R: ClinicRepository> InventoryAgent<R> {
    pub fn new(ctx: AgentContext<R>) -> Self {
        Self { ctx }
    }

    fn analyze(&self, clinic_id: &ClinicId) -> Result<InventoryReport, AgentError> {
        let items = self.ctx.repo.inventory_by_clinic(clinic_id)?;
        let now = self.ctx.now();

        let analysis = analyze_stock(&items, &self.ctx.config);
        let purchase_orders = self.draft_orders(clinic_id, &items, now);

        info!(
            agent = AgentKind::Inventory.display_name(),
            clinic = %clinic_id,
            total_items = analysis.total_items,
            low_stock = analysis.low_stock_items,
            out_of_stock = analysis.out_of_stock_items,
            orders = purchase_orders.len(),
            "stock analysis"
        );

        Ok(InventoryReport {
            agent: AgentKind::Inventory.display_name(),
            timestamp: now,
            clinic_id: clinic_id.clone(),
            analysis,
            purchase_orders,
            next_run: self.ctx.next_run(now),
        })
    }

    fn draft_orders(
        &self,
        clinic_id: &ClinicId,
        items: &[InventoryItem],
        now: DateTime<Utc>,
    ) -> Vec<DraftedOrder> {
        let threshold = self.ctx.config.low_stock_threshold;
        let quantity = self.ctx.config.reorder_quantity;

        items
            .iter()
            .filter(|item| item.is_below(threshold))
            .filter_map(|item| {
                let order = PurchaseOrder::create(
                    self.ctx.ids.purchase_order_id(),
                    clinic_id.clone(),
                    item.sku.clone(),
                    quantity,
                    now,
                );
                let drafted = DraftedOrder {
                    po_id: order.id.clone(),
                    sku: item.sku.clone(),
                    item_name: item.name.clone(),
                    quantity,
                    status: order.status,
                };

                match self.ctx.repo.add_purchase_order(order) {
                    Ok(()) => {
                        info!(
                            po = %drafted.po_id,
                            sku = %item.sku,
                            quantity,
                            "purchase order drafted"
                        );
                        Some(drafted)
                    }
                    Err(e) => {
                        warn!(
                            sku = %item.sku,
                            error = %e,
                            "failed to draft purchase order; skipping"
                        );
                        None
                    }
                }
            })
            .collect()
    }
}

impl<R: ClinicRepository> Agent for InventoryAgent<R> {
    type Report = InventoryReport;

    fn kind(&self) -> AgentKind {
        AgentKind::Inventory
    }

    fn run(&self, clinic_id: &ClinicId) -> Result<InventoryReport, AgentError> {
        let agent = AgentKind::Inventory.display_name();
        info!(agent, clinic = %clinic_id, "agent run started");
        self.analyze(clinic_id).inspect_err(|e| {
            error!(agent, clinic = %clinic_id, error = %e, "agent run failed");
        })
    }
}

fn analyze_stock(items: &[InventoryItem], config: &AgentConfig) -> StockAnalysis {
    let threshold = config.low_stock_threshold;
    let items_needing_reorder: Vec<ReorderSuggestion> = items
        .iter()
        .filter(|i| i.is_below(threshold))
        .map(|i| ReorderSuggestion {
            sku: i.sku.clone(),
            name: i.name.clone(),
            current_qty: i.quantity,
            suggested_qty: config.reorder_quantity,
        })
        .collect();
    let low_stock_items = items_needing_reorder.len();

    StockAnalysis {
        total_items: items.len(),
        low_stock_items,
        out_of_stock_items: items.iter().filter(|i| i.is_out_of_stock()).count(),
        total_inventory_value: fixed2(items.iter().map(InventoryItem::stock_value).sum()),
        low_stock_threshold: threshold,
        recommendation: if low_stock_items > config.critical_low_stock_count {
            "Critical: Multiple items low in stock"
        } else {
            "Stock levels healthy"
        },
        items_needing_reorder,
    }
}
