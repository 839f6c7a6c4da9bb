use thiserror::Error;
use crate::actor_framework::FrameworkError;
use crate::domain::PreOrderStatus;

/// Errors that can occur during pre-order operations.
///
/// Every variant is recoverable: the operation is aborted and stored state is
/// left as it was.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PreOrderError {
    #[error("Pre-order validation error: {0}")]
    ValidationError(String),
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: PreOrderStatus, to: PreOrderStatus },
    #[error("No eligible pre-orders: {0}")]
    NoEligibleItems(String),
    #[error("Pre-order not found: {0}")]
    NotFound(String),
    #[error("Pre-order persistence error: {0}")]
    PersistenceError(String),
}

impl From<FrameworkError<PreOrderError>> for PreOrderError {
    fn from(error: FrameworkError<PreOrderError>) -> Self {
        match error {
            FrameworkError::NotFound(id) => PreOrderError::NotFound(id),
            FrameworkError::Rejected(inner) => inner,
            other => PreOrderError::PersistenceError(other.to_string()),
        }
    }
}
