use tracing::{error, info, instrument};
use crate::actor_framework::Subscription;
use crate::clients::PreOrderClient;
use crate::domain::{Decision, PreOrder, PreOrderFilter, PreOrderStatus};
use crate::pre_order_actor::PreOrderError;

/// The approver's view: every pre-order waiting for a decision.
#[derive(Clone)]
pub struct ApprovalQueue {
    pre_orders: PreOrderClient,
}

impl ApprovalQueue {
    pub fn new(pre_orders: PreOrderClient) -> Self {
        Self { pre_orders }
    }

    /// Live list of orders in `AwaitingApproval`. It grows when approval is
    /// requested and shrinks as decisions are made.
    pub async fn list(&self) -> Result<Subscription<PreOrder>, PreOrderError> {
        self.pre_orders
            .subscribe(PreOrderFilter::with_status(PreOrderStatus::AwaitingApproval))
            .await
    }

    pub async fn approve(&self, id: String) -> Result<PreOrderStatus, PreOrderError> {
        self.decide(id, Decision::Approved).await
    }

    pub async fn reject(&self, id: String) -> Result<PreOrderStatus, PreOrderError> {
        self.decide(id, Decision::Rejected).await
    }

    /// No retry on failure; the operator re-submits the decision.
    #[instrument(name = "approval_decision", skip(self))]
    async fn decide(&self, id: String, decision: Decision) -> Result<PreOrderStatus, PreOrderError> {
        match self.pre_orders.decide(id, decision).await {
            Ok(status) => {
                info!(status = %status, "Pre-order decision recorded");
                Ok(status)
            }
            Err(e) => {
                error!(error = %e, "Failed to update pre-order status");
                Err(e)
            }
        }
    }
}
