use serde::{Deserialize, Serialize};

use clinicops_core::{ClinicId, Sku};

/// Stock level for one SKU in one clinic.
///
/// `(clinic_id, sku)` is unique. Quantity is unsigned so a decrement can never
/// leave the item below zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub clinic_id: ClinicId,
    pub sku: Sku,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "qty")]
    pub quantity: u64,
    #[serde(default)]
    pub unit_price: f64,
}

impl InventoryItem {
    pub fn new(clinic_id: ClinicId, sku: Sku, quantity: u64) -> Self {
        Self {
            clinic_id,
            sku,
            name: None,
            quantity,
            unit_price: 0.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_unit_price(mut self, unit_price: f64) -> Self {
        self.unit_price = unit_price;
        self
    }

    /// Add received stock.
    pub fn restock(&mut self, amount: u64) {
        self.quantity = self.quantity.saturating_add(amount);
    }

    /// Consume stock, bottoming out at zero.
    pub fn decrement(&mut self, amount: u64) {
        self.quantity = self.quantity.saturating_sub(amount);
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    pub fn is_below(&self, threshold: u64) -> bool {
        self.quantity < threshold
    }

    /// Quantity × unit price. A non-finite price contributes nothing.
    pub fn stock_value(&self) -> f64 {
        if self.unit_price.is_finite() {
            self.quantity as f64 * self.unit_price
        } else {
            0.0
        }
    }
}
