use crate::actor_framework::Entity;
use crate::domain::{PreOrder, PreOrderCreate, PreOrderPatch, PreOrderStatus};
use super::actions::PreOrderAction;
use super::error::PreOrderError;

impl Entity for PreOrder {
    type Id = String;
    type CreateParams = PreOrderCreate;
    type Patch = PreOrderPatch;
    type Action = PreOrderAction;
    type ActionResult = PreOrderStatus;
    type Error = PreOrderError;

    fn id(&self) -> &String { &self.id }

    /// Every pre-order starts out `Pending`.
    fn from_create_params(id: String, params: PreOrderCreate) -> Result<Self, PreOrderError> {
        if params.quantity == 0 {
            return Err(PreOrderError::ValidationError("Quantity must be positive".to_string()));
        }
        Ok(Self {
            id,
            item_id: params.item_id,
            item_name: params.item_name,
            unit: params.unit,
            quantity: params.quantity,
            order_date: params.order_date,
            expected_date: params.expected_date,
            status: PreOrderStatus::Pending,
        })
    }

    fn on_update(&mut self, patch: PreOrderPatch) -> Result<(), PreOrderError> {
        if let Some(status) = patch.status {
            self.transition_to(status)?;
        }
        Ok(())
    }

    /// Returns the status the order moved to.
    fn handle_action(&mut self, action: PreOrderAction) -> Result<PreOrderStatus, PreOrderError> {
        self.transition_to(action.target_status())?;
        Ok(self.status)
    }
}

impl PreOrder {
    pub fn transition_to(&mut self, next: PreOrderStatus) -> Result<(), PreOrderError> {
        if !self.status.can_transition_to(next) {
            return Err(PreOrderError::InvalidTransition { from: self.status, to: next });
        }
        self.status = next;
        Ok(())
    }
}
