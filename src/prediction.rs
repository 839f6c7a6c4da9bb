//! Stock-need prediction through an external text-completion service.
//!
//! The service is opaque: it receives a rendered prompt and answers with text.
//! This module prepares the two data summaries, fills the prompt template and
//! parses the three fields of the answer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument};
use crate::domain::{InventoryItem, PreOrder, PreOrderStatus};

const MIN_INPUT_LEN: usize = 10;

const PROMPT_TEMPLATE: &str = "You are an AI assistant that helps warehouse managers predict future stock needs.

Analyze the historical stock data and pre-order information provided to predict future stock requirements.
Provide a confidence level for the prediction and suggest actions to optimize inventory.

Historical Data: {{historicalData}}
Pre-Orders: {{preOrders}}

Based on this information, predict the future stock needs, provide a confidence level, and suggest actions.
Be as detailed as possible in your reasoning.
Answer with a single JSON object with the string fields \"predictedNeeds\", \"confidenceLevel\" and \"suggestedActions\".
";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PredictionError {
    #[error("Not enough data for a prediction: {0}")]
    InsufficientData(String),
    #[error("Completion service error: {0}")]
    Completion(String),
    #[error("Malformed prediction response: {0}")]
    MalformedResponse(String),
    #[error("Could not summarize data: {0}")]
    Summary(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPredictionRequest {
    pub historical_data: String,
    pub pre_orders: String,
}

impl StockPredictionRequest {
    pub fn validate(&self) -> Result<(), PredictionError> {
        if self.historical_data.trim().len() < MIN_INPUT_LEN {
            return Err(PredictionError::InsufficientData("Please provide more historical data.".to_string()));
        }
        if self.pre_orders.trim().len() < MIN_INPUT_LEN {
            return Err(PredictionError::InsufficientData("Please provide more pre-order data.".to_string()));
        }
        Ok(())
    }

    pub fn render_prompt(&self) -> String {
        PROMPT_TEMPLATE
            .replace("{{historicalData}}", &self.historical_data)
            .replace("{{preOrders}}", &self.pre_orders)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPrediction {
    pub predicted_needs: String,
    pub confidence_level: String,
    pub suggested_actions: String,
}

#[derive(Serialize)]
struct StockLevel<'a> {
    name: &'a str,
    quantity: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreOrderLine<'a> {
    item_name: &'a str,
    quantity: u32,
    expected_date: DateTime<Utc>,
    status: PreOrderStatus,
}

/// Current stock per item, as the "historical data" input.
pub fn historical_summary(items: &[InventoryItem]) -> Result<String, PredictionError> {
    let levels: Vec<StockLevel<'_>> = items
        .iter()
        .map(|item| StockLevel { name: &item.name, quantity: item.quantity })
        .collect();
    serde_json::to_string_pretty(&levels).map_err(|e| PredictionError::Summary(e.to_string()))
}

pub fn pre_order_summary(orders: &[PreOrder]) -> Result<String, PredictionError> {
    let lines: Vec<PreOrderLine<'_>> = orders
        .iter()
        .map(|order| PreOrderLine {
            item_name: &order.item_name,
            quantity: order.quantity,
            expected_date: order.expected_date,
            status: order.status,
        })
        .collect();
    serde_json::to_string_pretty(&lines).map_err(|e| PredictionError::Summary(e.to_string()))
}

/// An opaque text-completion backend.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, PredictionError>;
}

/// Backend used when no completion service is deployed. Every call fails with
/// [`PredictionError::Completion`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCompletion;

#[async_trait]
impl TextCompletion for DisabledCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, PredictionError> {
        Err(PredictionError::Completion("no completion service configured".to_string()))
    }
}

pub struct StockPredictor<C: TextCompletion> {
    completion: C,
}

impl<C: TextCompletion> StockPredictor<C> {
    pub fn new(completion: C) -> Self {
        Self { completion }
    }

    #[instrument(skip(self, request))]
    pub async fn predict(&self, request: &StockPredictionRequest) -> Result<StockPrediction, PredictionError> {
        request.validate()?;

        let prompt = request.render_prompt();
        debug!(prompt_len = prompt.len(), "Sending prediction prompt");
        let answer = self.completion.complete(&prompt).await.map_err(|e| {
            error!(error = %e, "Prediction request failed");
            e
        })?;

        let prediction = parse_prediction(&answer)?;
        info!(confidence = %prediction.confidence_level, "Stock prediction received");
        Ok(prediction)
    }
}

/// Models often wrap JSON in prose or code fences; only the outermost object is
/// parsed.
fn parse_prediction(answer: &str) -> Result<StockPrediction, PredictionError> {
    let start = answer.find('{');
    let end = answer.rfind('}');
    let body = match (start, end) {
        (Some(start), Some(end)) if start < end => &answer[start..=end],
        _ => return Err(PredictionError::MalformedResponse("no JSON object in answer".to_string())),
    };
    serde_json::from_str(body).map_err(|e| PredictionError::MalformedResponse(e.to_string()))
}
