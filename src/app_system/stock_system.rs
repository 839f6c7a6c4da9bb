use tracing::{error, info};
use crate::actor_framework::ResourceActor;
use crate::app_system::AppConfig;
use crate::clients::{ApprovalQueue, InventoryClient, PreOrderClient};
use crate::domain::{InventoryItem, PreOrder};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub const INVENTORY_COLLECTION: &str = "inventory";
pub const PRE_ORDER_COLLECTION: &str = "pre-orders";

/// The main application system that owns both collection actors.
///
/// Responsible for starting up actors, wiring clients together, and handling
/// shutdown. Nothing is global: callers get the clients from here.
pub struct StockSystem {
    pub inventory_client: InventoryClient,
    pub pre_order_client: PreOrderClient,
    pub approval_queue: ApprovalQueue,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

fn sequential_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || {
        let id = counter.fetch_add(1, Ordering::SeqCst);
        format!("{}_{}", prefix, id)
    }
}

impl StockSystem {
    pub fn new(config: &AppConfig) -> Self {
        let buffer_size = config.actors.buffer_size;

        // 1. Inventory collection
        let (inventory_actor, inventory_resource_client) =
            ResourceActor::<InventoryItem>::new(INVENTORY_COLLECTION, buffer_size, sequential_ids("item"));
        let inventory_client = InventoryClient::new(inventory_resource_client);
        let inventory_handle = tokio::spawn(inventory_actor.run());

        // 2. Pre-order collection, validated against the inventory
        let (pre_order_actor, pre_order_resource_client) =
            ResourceActor::<PreOrder>::new(PRE_ORDER_COLLECTION, buffer_size, sequential_ids("po"));
        let pre_order_client = PreOrderClient::new(pre_order_resource_client, inventory_client.clone());
        let pre_order_handle = tokio::spawn(pre_order_actor.run());

        // 3. Approval queue over the pre-order collection
        let approval_queue = ApprovalQueue::new(pre_order_client.clone());

        info!(buffer_size, "Stock system started");
        Self {
            inventory_client,
            pre_order_client,
            approval_queue,
            handles: vec![inventory_handle, pre_order_handle],
        }
    }

    /// Drops every client so the actors see their channels close, then waits for
    /// them. Clients cloned elsewhere keep their actor alive until dropped.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.approval_queue);
        drop(self.pre_order_client);
        drop(self.inventory_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
