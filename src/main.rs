mod domain;
mod clients;

mod app_system;

#[cfg(test)]
mod mock_framework;

mod actor_framework;
mod inventory_actor;
mod pre_order_actor;

mod delivery_note;
mod prediction;

use chrono::{Duration, Utc};
use tracing::{error, info, warn, Instrument};
use crate::app_system::{setup_tracing, AppConfig, StockSystem};
use crate::delivery_note::PlainTextRenderer;
use crate::domain::{InventoryItemCreate, NewPreOrder, PreOrderFilter};
use crate::pre_order_actor::PreOrderError;
use crate::prediction::{historical_summary, pre_order_summary, DisabledCompletion, StockPredictionRequest, StockPredictor};

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = AppConfig::load().map_err(|e| e.to_string())?;

    // Setup tracing once for the entire application
    setup_tracing(&config.logging.filter);

    info!("Starting stock system");

    // Create both collections and the approval queue
    let system = StockSystem::new(&config);

    // Seed the catalog
    let span = tracing::info_span!("inventory_seeding");
    let item_ids = async {
        let mut ids = Vec::new();
        for item in [
            InventoryItemCreate::new("Laptop Pro 15\"", "ELEC-001", 15).category("Electronics").supplier("TechSource"),
            InventoryItemCreate::new("Office Chair", "FURN-002", 30).unit("Unit").category("Furniture"),
            InventoryItemCreate::new("A4 Paper", "OFF-003", 120).unit("Ream").category("Office").supplier("PaperCo"),
        ] {
            ids.push(system.inventory_client.create_inventory_item(item).await.map_err(|e| e.to_string())?);
        }
        Ok::<_, String>(ids)
    }
    .instrument(span)
    .await?;

    info!(items = item_ids.len(), "Inventory seeded");

    // Record pre-orders; the last one is invalid and is reported, not stored
    let span = tracing::info_span!("pre_order_intake");
    let pre_order_ids = async {
        let mut ids = Vec::new();
        for (item_id, quantity, days) in [(&item_ids[0], 10, 17), (&item_ids[1], 5, 20), (&item_ids[2], -1, 5)] {
            let request = NewPreOrder::new(item_id.clone(), quantity, Utc::now() + Duration::days(days));
            match system.pre_order_client.create_pre_order(request).await {
                Ok(id) => ids.push(id),
                Err(e) => warn!(error = %e, "Pre-order not recorded"),
            }
        }
        ids
    }
    .instrument(span)
    .await;

    // Send the pending orders for approval and decide on them
    let span = tracing::info_span!("approval_workflow");
    let approved = async {
        let mut queue = system.approval_queue.list().await?;
        system.pre_order_client.request_approval(&pre_order_ids).await?;

        let waiting = queue
            .changed()
            .await
            .ok_or_else(|| PreOrderError::PersistenceError("Pre-order collection stopped".to_string()))?;
        info!(waiting = waiting.len(), "Approval queue updated");

        let mut approved = Vec::new();
        for (index, order) in waiting.iter().enumerate() {
            if index % 2 == 0 {
                system.approval_queue.approve(order.id.clone()).await?;
                approved.push(order.id.clone());
            } else {
                system.approval_queue.reject(order.id.clone()).await?;
            }
        }
        queue.cancel();
        Ok::<_, PreOrderError>(approved)
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    // Print a delivery note for the approved orders
    match system
        .pre_order_client
        .export_delivery_note(&approved, &config.delivery_note, &PlainTextRenderer::default())
        .await
    {
        Ok(note) => println!("{}", note),
        Err(e) => error!(error = %e, "Delivery note not printed"),
    }

    for id in &approved {
        if let Err(e) = system.pre_order_client.mark_fulfilled(id.clone()).await {
            error!(pre_order_id = %id, error = %e, "Fulfillment failed");
        }
    }

    // Ask for a stock prediction from the current state
    let span = tracing::info_span!("stock_prediction");
    async {
        let items = system.inventory_client.list_inventory_items().await.map_err(|e| e.to_string())?;
        let orders = system
            .pre_order_client
            .subscribe(PreOrderFilter::all())
            .await
            .map_err(|e| e.to_string())?
            .current();

        let request = StockPredictionRequest {
            historical_data: historical_summary(&items).map_err(|e| e.to_string())?,
            pre_orders: pre_order_summary(&orders).map_err(|e| e.to_string())?,
        };
        let predictor = StockPredictor::new(DisabledCompletion);
        match predictor.predict(&request).await {
            Ok(prediction) => info!(
                predicted_needs = %prediction.predicted_needs,
                confidence = %prediction.confidence_level,
                suggested_actions = %prediction.suggested_actions,
                "Stock prediction ready"
            ),
            Err(e) => warn!(error = %e, "Prediction skipped"),
        }
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
