use tracing::{debug, info, instrument};
use crate::actor_framework::ResourceClient;
use crate::domain::{InventoryItem, InventoryItemCreate, InventoryItemPatch};
use crate::inventory_actor::InventoryError;

/// Client for the inventory collection.
#[derive(Clone)]
pub struct InventoryClient {
    inner: ResourceClient<InventoryItem>,
}

impl_basic_client!(InventoryClient, InventoryItem, InventoryError, inventory_item);

impl InventoryClient {
    #[instrument(skip(self, item), fields(item_name = %item.name, sku = %item.sku))]
    pub async fn create_inventory_item(&self, item: InventoryItemCreate) -> Result<String, InventoryError> {
        debug!("Sending request");
        let id = self.inner.create(item).await?;
        info!(item_id = %id, "Inventory item created");
        Ok(id)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_inventory_item(&self, id: String, patch: InventoryItemPatch) -> Result<InventoryItem, InventoryError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(InventoryError::from)
    }
}
