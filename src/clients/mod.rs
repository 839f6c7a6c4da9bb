//! Typed clients over the collection actors, plus the workflows built on them.

#[macro_use]
mod macros;

pub mod approval_queue;
pub mod inventory_client;
pub mod pre_order_client;

pub use approval_queue::ApprovalQueue;
pub use inventory_client::InventoryClient;
pub use pre_order_client::PreOrderClient;
