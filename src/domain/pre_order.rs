use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a pre-order sits in the approval workflow.
///
/// ```text
/// Pending -> AwaitingApproval -> Approved -> Fulfilled
///                             \           \-> Cancelled
///                              \-> Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreOrderStatus {
    Pending,
    #[serde(rename = "Awaiting Approval")]
    AwaitingApproval,
    Approved,
    Rejected,
    Fulfilled,
    Cancelled,
}

impl PreOrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Fulfilled | Self::Cancelled)
    }

    /// Fulfillment and cancellation require an approved order; an order still
    /// `Pending` has to go through the approval queue first.
    pub fn can_transition_to(self, next: PreOrderStatus) -> bool {
        use PreOrderStatus::*;
        matches!(
            (self, next),
            (Pending, AwaitingApproval)
                | (AwaitingApproval, Approved)
                | (AwaitingApproval, Rejected)
                | (Approved, Fulfilled)
                | (Approved, Cancelled)
        )
    }
}

impl fmt::Display for PreOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::AwaitingApproval => "Awaiting Approval",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Fulfilled => "Fulfilled",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

/// An operator's verdict on a pre-order waiting in the approval queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn status(self) -> PreOrderStatus {
        match self {
            Decision::Approved => PreOrderStatus::Approved,
            Decision::Rejected => PreOrderStatus::Rejected,
        }
    }
}

/// An anticipated restock of a single inventory item.
///
/// `item_name` and `unit` are copied from the inventory item when the pre-order
/// is created and are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreOrder {
    pub id: String,
    pub item_id: String,
    pub item_name: String,
    pub unit: String,
    pub quantity: u32,
    pub order_date: DateTime<Utc>,
    pub expected_date: DateTime<Utc>,
    pub status: PreOrderStatus,
}

/// Operator input for a new pre-order, before validation.
#[derive(Debug, Clone)]
pub struct NewPreOrder {
    pub item_id: String,
    pub quantity: i64,
    pub expected_date: DateTime<Utc>,
}

impl NewPreOrder {
    pub fn new(item_id: impl Into<String>, quantity: i64, expected_date: DateTime<Utc>) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            expected_date,
        }
    }
}

/// Validated, denormalized payload stored by the pre-order collection.
#[derive(Debug, Clone)]
pub struct PreOrderCreate {
    pub item_id: String,
    pub item_name: String,
    pub unit: String,
    pub quantity: u32,
    pub order_date: DateTime<Utc>,
    pub expected_date: DateTime<Utc>,
}

/// Status is the only field that changes after creation.
#[derive(Debug, Clone, Default)]
pub struct PreOrderPatch {
    pub status: Option<PreOrderStatus>,
}

/// Filters offered on the pre-orders list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreOrderFilter {
    pub status: Option<PreOrderStatus>,
    pub expected_on: Option<NaiveDate>,
}

impl PreOrderFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(status: PreOrderStatus) -> Self {
        Self {
            status: Some(status),
            expected_on: None,
        }
    }

    pub fn expected_on(mut self, date: NaiveDate) -> Self {
        self.expected_on = Some(date);
        self
    }

    pub fn matches(&self, order: &PreOrder) -> bool {
        let status_match = self.status.map_or(true, |status| order.status == status);
        let date_match = self
            .expected_on
            .map_or(true, |date| order.expected_date.date_naive() == date);
        status_match && date_match
    }
}
