use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_UNIT: &str = "Pcs";

/// Represents a stock-keeping item in the warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub quantity: u32,
    pub unit: String,
    pub category: String,
    pub supplier: String,
    pub last_updated: DateTime<Utc>,
}

/// Payload for registering a new inventory item.
#[derive(Debug, Clone)]
pub struct InventoryItemCreate {
    pub name: String,
    pub sku: String,
    pub quantity: u32,
    pub unit: String,
    pub category: String,
    pub supplier: String,
}

impl InventoryItemCreate {
    pub fn new(name: impl Into<String>, sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            sku: sku.into(),
            quantity,
            unit: DEFAULT_UNIT.to_string(),
            category: String::new(),
            supplier: String::new(),
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = supplier.into();
        self
    }
}

/// Payload for editing an existing inventory item.
#[derive(Debug, Clone, Default)]
pub struct InventoryItemPatch {
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub unit: Option<String>,
}
