use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};
use crate::actor_framework::{ResourceClient, Subscription};
use crate::clients::InventoryClient;
use crate::delivery_note::{DeliveryNote, DeliveryNoteHeader, DeliveryNoteRenderer};
use crate::domain::{Decision, NewPreOrder, PreOrder, PreOrderCreate, PreOrderFilter, PreOrderStatus};
use crate::pre_order_actor::{PreOrderAction, PreOrderError};

/// Client for the pre-order collection.
///
/// Owns the pre-order workflow: creation against the inventory catalog, batched
/// approval requests, decisions, fulfillment/cancellation, and selection of
/// approved orders for a delivery note. Status rules themselves live on the
/// entity, so every write path here is checked the same way.
#[derive(Clone)]
pub struct PreOrderClient {
    inner: ResourceClient<PreOrder>,
    inventory_client: InventoryClient,
}

impl PreOrderClient {
    pub fn new(inner: ResourceClient<PreOrder>, inventory_client: InventoryClient) -> Self {
        Self {
            inner,
            inventory_client,
        }
    }

    /// Validates the request, snapshots the item's name and unit, and stores a
    /// new `Pending` pre-order. Returns its id.
    #[instrument(skip(self, new_order), fields(item_id = %new_order.item_id, quantity = new_order.quantity))]
    pub async fn create_pre_order(&self, new_order: NewPreOrder) -> Result<String, PreOrderError> {
        info!("Processing create_pre_order request");

        if new_order.quantity <= 0 {
            warn!("Rejected non-positive quantity");
            return Err(PreOrderError::ValidationError(format!(
                "Quantity must be positive, got {}",
                new_order.quantity
            )));
        }
        let quantity = u32::try_from(new_order.quantity).map_err(|_| {
            PreOrderError::ValidationError(format!("Quantity too large: {}", new_order.quantity))
        })?;

        // Step 1: Validate inventory item
        let item = match self.inventory_client.get_inventory_item(new_order.item_id.clone()).await {
            Ok(Some(item)) => {
                info!(item_name = %item.name, "Inventory item validation successful");
                item
            }
            Ok(None) => {
                error!("Inventory item not found");
                return Err(PreOrderError::ValidationError(format!(
                    "Inventory item not found: {}",
                    new_order.item_id
                )));
            }
            Err(e) => {
                error!(error = %e, "Inventory item lookup failed");
                return Err(PreOrderError::PersistenceError(format!("Inventory item lookup failed: {}", e)));
            }
        };

        // Step 2: Store the denormalized pre-order
        let params = PreOrderCreate {
            item_id: item.id,
            item_name: item.name,
            unit: item.unit,
            quantity,
            order_date: Utc::now(),
            expected_date: new_order.expected_date,
        };

        let id = self.inner.create(params).await.map_err(|e| {
            error!(error = %e, "Pre-order creation failed");
            PreOrderError::from(e)
        })?;
        info!(pre_order_id = %id, "Pre-order created");
        Ok(id)
    }

    /// Sends the `Pending` members of `selected_ids` to the approval queue in one
    /// batch. Non-pending or unknown selections are skipped. Eligibility is
    /// decided by the collection itself, so a concurrent write to one selected
    /// order cannot fail the rest. Returns the ids that advanced, in storage order.
    #[instrument(skip(self, selected_ids), fields(selected = selected_ids.len()))]
    pub async fn request_approval(&self, selected_ids: &[String]) -> Result<Vec<String>, PreOrderError> {
        debug!("Sending request");

        let advanced = if selected_ids.is_empty() {
            Vec::new()
        } else {
            self.inner
                .batch_action_where(selected_ids.to_vec(), PreOrderAction::RequestApproval, |order: &PreOrder| {
                    order.status == PreOrderStatus::Pending
                })
                .await
                .map_err(|e| {
                    error!(error = %e, "Approval request failed");
                    PreOrderError::from(e)
                })?
        };

        if advanced.is_empty() {
            warn!("No pending pre-orders in selection");
            return Err(PreOrderError::NoEligibleItems(
                "Select pending pre-orders to request approval".to_string(),
            ));
        }

        let ids: Vec<String> = advanced.into_iter().map(|(id, _)| id).collect();
        info!(count = ids.len(), "Pre-orders sent for approval");
        Ok(ids)
    }

    /// Resolves an order in the approval queue.
    #[instrument(skip(self))]
    pub async fn decide(&self, id: String, decision: Decision) -> Result<PreOrderStatus, PreOrderError> {
        self.transition(id, PreOrderAction::Decide(decision)).await
    }

    #[instrument(skip(self))]
    pub async fn mark_fulfilled(&self, id: String) -> Result<PreOrderStatus, PreOrderError> {
        self.transition(id, PreOrderAction::MarkFulfilled).await
    }

    #[instrument(skip(self))]
    pub async fn mark_cancelled(&self, id: String) -> Result<PreOrderStatus, PreOrderError> {
        self.transition(id, PreOrderAction::MarkCancelled).await
    }

    async fn transition(&self, id: String, action: PreOrderAction) -> Result<PreOrderStatus, PreOrderError> {
        debug!("Sending request");
        match self.inner.perform_action(id, action).await {
            Ok(status) => {
                info!(status = %status, "Pre-order status updated");
                Ok(status)
            }
            Err(e) => {
                let e = PreOrderError::from(e);
                warn!(error = %e, "Pre-order status update rejected");
                Err(e)
            }
        }
    }

    /// Approved orders among `ids`, in storage order.
    #[instrument(skip(self, ids), fields(selected = ids.len()))]
    pub async fn select_for_delivery_note(&self, ids: &[String]) -> Result<Vec<PreOrder>, PreOrderError> {
        debug!("Sending request");

        let approved: Vec<PreOrder> = self
            .inner
            .list()
            .await?
            .into_iter()
            .filter(|order| order.status == PreOrderStatus::Approved && ids.contains(&order.id))
            .collect();

        if approved.is_empty() {
            warn!("No approved pre-orders in selection");
            return Err(PreOrderError::NoEligibleItems(
                "Select approved pre-orders to print a delivery note".to_string(),
            ));
        }
        Ok(approved)
    }

    /// Renders a delivery note for the approved orders among `ids`.
    #[instrument(skip(self, ids, header, renderer), fields(selected = ids.len()))]
    pub async fn export_delivery_note<R: DeliveryNoteRenderer + ?Sized>(
        &self,
        ids: &[String],
        header: &DeliveryNoteHeader,
        renderer: &R,
    ) -> Result<String, PreOrderError> {
        let orders = self.select_for_delivery_note(ids).await?;
        let note = DeliveryNote::new(header.clone(), Utc::now().date_naive(), &orders);
        info!(lines = note.lines.len(), "Delivery note prepared");
        Ok(renderer.render(&note))
    }

    /// Live view of the pre-orders matching `filter`, newest order first.
    #[instrument(skip(self))]
    pub async fn subscribe(&self, filter: PreOrderFilter) -> Result<Subscription<PreOrder>, PreOrderError> {
        debug!("Sending request");
        let subscription = self
            .inner
            .subscribe(move |order: &PreOrder| filter.matches(order))
            .await?;
        Ok(subscription.order_by(|a, b| b.order_date.cmp(&a.order_date)))
    }
}

impl_client_methods!(PreOrderClient, PreOrder, PreOrderError, pre_order);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;
    use crate::delivery_note::PlainTextRenderer;
    use crate::domain::{InventoryItem, InventoryItemCreate, InventoryItemPatch};
    use chrono::{DateTime, Duration};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn counter_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
        let counter = Arc::new(AtomicU64::new(1));
        move || format!("{}_{}", prefix, counter.fetch_add(1, Ordering::SeqCst))
    }

    fn spawn_clients() -> (InventoryClient, PreOrderClient) {
        let (inventory_actor, inventory_inner) = ResourceActor::<InventoryItem>::new("inventory", 16, counter_ids("item"));
        let (pre_order_actor, pre_order_inner) = ResourceActor::<PreOrder>::new("pre-orders", 16, counter_ids("po"));
        tokio::spawn(inventory_actor.run());
        tokio::spawn(pre_order_actor.run());

        let inventory = InventoryClient::new(inventory_inner);
        let pre_orders = PreOrderClient::new(pre_order_inner, inventory.clone());
        (inventory, pre_orders)
    }

    fn expected() -> DateTime<Utc> {
        Utc::now() + Duration::days(14)
    }

    async fn seed_item(inventory: &InventoryClient) -> String {
        inventory
            .create_inventory_item(InventoryItemCreate::new("X", "SKU-X", 40).unit("Box"))
            .await
            .unwrap()
    }

    async fn status_of(client: &PreOrderClient, id: &str) -> PreOrderStatus {
        client.get_pre_order(id.to_string()).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_create_snapshots_item_fields() {
        let (inventory, pre_orders) = spawn_clients();
        let item_id = seed_item(&inventory).await;

        let id = pre_orders.create_pre_order(NewPreOrder::new(item_id.clone(), 10, expected())).await.unwrap();
        let order = pre_orders.get_pre_order(id).await.unwrap().unwrap();
        assert_eq!(order.status, PreOrderStatus::Pending);
        assert_eq!(order.item_name, "X");
        assert_eq!(order.unit, "Box");
        assert_eq!(order.quantity, 10);

        inventory
            .update_inventory_item(item_id, InventoryItemPatch { name: Some("Renamed".into()), ..Default::default() })
            .await
            .unwrap();
        let order = pre_orders.get_pre_order(order.id).await.unwrap().unwrap();
        assert_eq!(order.item_name, "X");
    }

    #[tokio::test]
    async fn test_create_validates_quantity_and_item() {
        let (inventory, pre_orders) = spawn_clients();
        let item_id = seed_item(&inventory).await;

        let b = pre_orders.create_pre_order(NewPreOrder::new(item_id.clone(), 5, expected())).await;
        let c = pre_orders.create_pre_order(NewPreOrder::new(item_id.clone(), -1, expected())).await;
        assert!(b.is_ok());
        assert!(matches!(c, Err(PreOrderError::ValidationError(_))));

        let zero = pre_orders.create_pre_order(NewPreOrder::new(item_id, 0, expected())).await;
        assert!(matches!(zero, Err(PreOrderError::ValidationError(_))));

        let missing = pre_orders.create_pre_order(NewPreOrder::new("item_404", 3, expected())).await;
        assert_eq!(
            missing,
            Err(PreOrderError::ValidationError("Inventory item not found: item_404".to_string()))
        );

        assert_eq!(pre_orders.list_pre_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_order_leaves_the_queue_for_good() {
        let (inventory, pre_orders) = spawn_clients();
        let item_id = seed_item(&inventory).await;
        let a = pre_orders.create_pre_order(NewPreOrder::new(item_id, 10, expected())).await.unwrap();
        assert_eq!(status_of(&pre_orders, &a).await, PreOrderStatus::Pending);

        let advanced = pre_orders.request_approval(&[a.clone()]).await.unwrap();
        assert_eq!(advanced, vec![a.clone()]);
        assert_eq!(status_of(&pre_orders, &a).await, PreOrderStatus::AwaitingApproval);

        assert_eq!(pre_orders.decide(a.clone(), Decision::Rejected).await, Ok(PreOrderStatus::Rejected));
        assert_eq!(status_of(&pre_orders, &a).await, PreOrderStatus::Rejected);

        let err = pre_orders.decide(a.clone(), Decision::Approved).await.unwrap_err();
        assert_eq!(err, PreOrderError::InvalidTransition {
            from: PreOrderStatus::Rejected,
            to: PreOrderStatus::Approved,
        });
        assert_eq!(status_of(&pre_orders, &a).await, PreOrderStatus::Rejected);
    }

    #[tokio::test]
    async fn test_request_approval_only_advances_pending_orders() {
        let (inventory, pre_orders) = spawn_clients();
        let item_id = seed_item(&inventory).await;
        let mut ids = Vec::new();
        for qty in [1, 2, 3] {
            ids.push(pre_orders.create_pre_order(NewPreOrder::new(item_id.clone(), qty, expected())).await.unwrap());
        }
        let untouched = pre_orders.create_pre_order(NewPreOrder::new(item_id, 4, expected())).await.unwrap();

        pre_orders.request_approval(&ids[..1]).await.unwrap();
        pre_orders.decide(ids[0].clone(), Decision::Approved).await.unwrap();

        let advanced = pre_orders.request_approval(&ids).await.unwrap();
        assert_eq!(advanced, vec![ids[1].clone(), ids[2].clone()]);

        assert_eq!(status_of(&pre_orders, &ids[0]).await, PreOrderStatus::Approved);
        assert_eq!(status_of(&pre_orders, &ids[1]).await, PreOrderStatus::AwaitingApproval);
        assert_eq!(status_of(&pre_orders, &ids[2]).await, PreOrderStatus::AwaitingApproval);
        assert_eq!(status_of(&pre_orders, &untouched).await, PreOrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_request_approval_skips_deleted_selection() {
        let (inventory, pre_orders) = spawn_clients();
        let item_id = seed_item(&inventory).await;
        let a = pre_orders.create_pre_order(NewPreOrder::new(item_id.clone(), 10, expected())).await.unwrap();
        let b = pre_orders.create_pre_order(NewPreOrder::new(item_id, 5, expected())).await.unwrap();

        pre_orders.delete_pre_order(b.clone()).await.unwrap();
        let advanced = pre_orders.request_approval(&[a.clone(), b]).await.unwrap();
        assert_eq!(advanced, vec![a.clone()]);
        assert_eq!(status_of(&pre_orders, &a).await, PreOrderStatus::AwaitingApproval);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_request_approval_races_with_delete() {
        let (inventory, pre_orders) = spawn_clients();
        let item_id = seed_item(&inventory).await;

        for _ in 0..100 {
            let a = pre_orders.create_pre_order(NewPreOrder::new(item_id.clone(), 10, expected())).await.unwrap();
            let b = pre_orders.create_pre_order(NewPreOrder::new(item_id.clone(), 5, expected())).await.unwrap();

            let approver = pre_orders.clone();
            let selection = vec![a.clone(), b.clone()];
            let request = tokio::spawn(async move { approver.request_approval(&selection).await });
            let deleter = pre_orders.clone();
            let removed = b.clone();
            let delete = tokio::spawn(async move { deleter.delete_pre_order(removed).await });

            let advanced = request.await.unwrap().unwrap();
            delete.await.unwrap().unwrap();

            assert_eq!(advanced[0], a);
            assert!(advanced.len() == 1 || advanced[1] == b);
            assert_eq!(status_of(&pre_orders, &a).await, PreOrderStatus::AwaitingApproval);
        }
    }

    #[tokio::test]
    async fn test_request_approval_without_pending_members_fails() {
        let (inventory, pre_orders) = spawn_clients();
        let item_id = seed_item(&inventory).await;
        let a = pre_orders.create_pre_order(NewPreOrder::new(item_id, 10, expected())).await.unwrap();
        pre_orders.request_approval(&[a.clone()]).await.unwrap();

        let empty = pre_orders.request_approval(&[]).await;
        assert!(matches!(empty, Err(PreOrderError::NoEligibleItems(_))));

        let again = pre_orders.request_approval(&[a.clone(), "po_404".to_string()]).await;
        assert!(matches!(again, Err(PreOrderError::NoEligibleItems(_))));
        assert_eq!(status_of(&pre_orders, &a).await, PreOrderStatus::AwaitingApproval);
    }

    #[tokio::test]
    async fn test_fulfillment_requires_approval() {
        let (inventory, pre_orders) = spawn_clients();
        let item_id = seed_item(&inventory).await;
        let a = pre_orders.create_pre_order(NewPreOrder::new(item_id.clone(), 10, expected())).await.unwrap();
        let b = pre_orders.create_pre_order(NewPreOrder::new(item_id, 20, expected())).await.unwrap();

        assert!(matches!(
            pre_orders.mark_cancelled(a.clone()).await,
            Err(PreOrderError::InvalidTransition { from: PreOrderStatus::Pending, .. })
        ));

        pre_orders.request_approval(&[a.clone(), b.clone()]).await.unwrap();
        pre_orders.decide(a.clone(), Decision::Approved).await.unwrap();
        pre_orders.decide(b.clone(), Decision::Approved).await.unwrap();

        assert_eq!(pre_orders.mark_fulfilled(a.clone()).await, Ok(PreOrderStatus::Fulfilled));
        assert_eq!(pre_orders.mark_cancelled(b.clone()).await, Ok(PreOrderStatus::Cancelled));
        assert!(pre_orders.mark_fulfilled(b).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_is_unconditional() {
        let (inventory, pre_orders) = spawn_clients();
        let item_id = seed_item(&inventory).await;
        let a = pre_orders.create_pre_order(NewPreOrder::new(item_id, 10, expected())).await.unwrap();
        pre_orders.request_approval(&[a.clone()]).await.unwrap();
        pre_orders.decide(a.clone(), Decision::Rejected).await.unwrap();

        pre_orders.delete_pre_order(a.clone()).await.unwrap();
        assert_eq!(pre_orders.get_pre_order(a.clone()).await.unwrap(), None);
        assert_eq!(pre_orders.delete_pre_order(a.clone()).await, Err(PreOrderError::NotFound(a)));
    }

    #[tokio::test]
    async fn test_delivery_note_uses_approved_orders_only() {
        let (inventory, pre_orders) = spawn_clients();
        let item_id = seed_item(&inventory).await;
        let a = pre_orders.create_pre_order(NewPreOrder::new(item_id.clone(), 10, expected())).await.unwrap();
        let b = pre_orders.create_pre_order(NewPreOrder::new(item_id, 7, expected())).await.unwrap();
        let selection = vec![a.clone(), b.clone()];

        let none = pre_orders.select_for_delivery_note(&selection).await;
        assert!(matches!(none, Err(PreOrderError::NoEligibleItems(_))));

        pre_orders.request_approval(&selection).await.unwrap();
        pre_orders.decide(b.clone(), Decision::Approved).await.unwrap();

        let selected = pre_orders.select_for_delivery_note(&selection).await.unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, b);

        let header = DeliveryNoteHeader::new("Stationery Inventory", "Jakarta");
        let rendered = pre_orders
            .export_delivery_note(&selection, &header, &PlainTextRenderer::default())
            .await
            .unwrap();
        assert!(rendered.contains("SURAT JALAN"));
        assert!(rendered.contains("Box"));
    }

    #[tokio::test]
    async fn test_subscription_tracks_status_filter() {
        let (inventory, pre_orders) = spawn_clients();
        let item_id = seed_item(&inventory).await;
        let a = pre_orders.create_pre_order(NewPreOrder::new(item_id, 10, expected())).await.unwrap();

        let mut pending = pre_orders.subscribe(PreOrderFilter::with_status(PreOrderStatus::Pending)).await.unwrap();
        assert_eq!(pending.current().len(), 1);

        pre_orders.request_approval(&[a]).await.unwrap();
        let view = pending.changed().await.unwrap();
        assert!(view.is_empty());
    }
}
