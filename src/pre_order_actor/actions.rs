use crate::domain::{Decision, PreOrderStatus};

/// Status transitions that can be requested on a stored pre-order.
///
/// The entity checks every transition against the workflow graph, whether the
/// action arrives alone or as part of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreOrderAction {
    /// Moves a `Pending` order into the approval queue.
    RequestApproval,
    /// Resolves an order waiting in the approval queue.
    Decide(Decision),
    MarkFulfilled,
    MarkCancelled,
}

impl PreOrderAction {
    pub fn target_status(self) -> PreOrderStatus {
        match self {
            PreOrderAction::RequestApproval => PreOrderStatus::AwaitingApproval,
            PreOrderAction::Decide(decision) => decision.status(),
            PreOrderAction::MarkFulfilled => PreOrderStatus::Fulfilled,
            PreOrderAction::MarkCancelled => PreOrderStatus::Cancelled,
        }
    }
}
