use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clinicops_core::{ClinicId, PurchaseOrderId, Sku};

/// Purchase order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    #[default]
    Created,
    Sent,
    Received,
    Cancelled,
    #[serde(other)]
    Other,
}

/// A replenishment order for one SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    pub clinic_id: ClinicId,
    pub sku: Sku,
    #[serde(alias = "qty")]
    pub quantity: u64,
    #[serde(default)]
    pub status: PurchaseOrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PurchaseOrder {
    /// Draft a new order in `created` status.
    pub fn create(
        id: PurchaseOrderId,
        clinic_id: ClinicId,
        sku: Sku,
        quantity: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            clinic_id,
            sku,
            quantity,
            status: PurchaseOrderStatus::Created,
            created_at: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_sets_created_status_and_timestamp() {
        let now = Utc::now();
        let po = PurchaseOrder::create(
            PurchaseOrderId::new("po-1"),
            ClinicId::new("c1"),
            Sku::new("GAUZE"),
            100,
            now,
        );
        assert_eq!(po.status, PurchaseOrderStatus::Created);
        assert_eq!(po.quantity, 100);
        assert_eq!(po.created_at, Some(now));

        let json = serde_json::to_value(&po).unwrap();
        assert_eq!(json["status"], "created");
        assert_eq!(json["clinicId"], "c1");
    }
}
