use thiserror::Error;
use crate::actor_framework::FrameworkError;

/// Errors that can occur during inventory operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InventoryError {
    #[error("Inventory item not found: {0}")]
    NotFound(String),
    #[error("Inventory validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<InventoryError>> for InventoryError {
    fn from(error: FrameworkError<InventoryError>) -> Self {
        match error {
            FrameworkError::NotFound(id) => InventoryError::NotFound(id),
            FrameworkError::Rejected(inner) => inner,
            other => InventoryError::ActorCommunicationError(other.to_string()),
        }
    }
}
