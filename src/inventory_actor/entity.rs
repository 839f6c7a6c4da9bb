use chrono::Utc;
use crate::actor_framework::Entity;
use crate::domain::{InventoryItem, InventoryItemCreate, InventoryItemPatch};
use super::error::InventoryError;

impl Entity for InventoryItem {
    type Id = String;
    type CreateParams = InventoryItemCreate;
    type Patch = InventoryItemPatch;
    type Action = ();
    type ActionResult = ();
    type Error = InventoryError;

    fn id(&self) -> &String { &self.id }

    /// Creates a new InventoryItem from creation parameters.
    ///
    /// # Errors
    /// Fails when the name is blank.
    fn from_create_params(id: String, params: InventoryItemCreate) -> Result<Self, InventoryError> {
        if params.name.trim().is_empty() {
            return Err(InventoryError::ValidationError("Item name required".to_string()));
        }
        Ok(Self {
            id,
            name: params.name,
            sku: params.sku,
            quantity: params.quantity,
            unit: params.unit,
            category: params.category,
            supplier: params.supplier,
            last_updated: Utc::now(),
        })
    }

    /// Updates name, stock level and/or unit, and stamps `last_updated`.
    fn on_update(&mut self, patch: InventoryItemPatch) -> Result<(), InventoryError> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(InventoryError::ValidationError("Item name required".to_string()));
            }
            self.name = name;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(unit) = patch.unit {
            self.unit = unit;
        }
        self.last_updated = Utc::now();
        Ok(())
    }

    /// Inventory items have no custom actions.
    fn handle_action(&mut self, _action: ()) -> Result<(), InventoryError> {
        Ok(())
    }
}
