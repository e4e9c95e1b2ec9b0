use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use tracing::{info, warn};

use super::{validate_quantity, AppState};
use crate::error::AppError;
use crate::metering::{MeteringBackend, TrackEvent};
use crate::metrics;
use crate::pricing::{PricingModel, Quote};

/// Event type recorded after every successful calculation
pub const BILLING_CALCULATION_EVENT: &str = "billing_calculation";

#[derive(Debug, Serialize, Deserialize)]
pub struct PricingModelsResponse {
    pub data: Vec<PricingModel>,
}

#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub usage: Option<f64>,
}

/// GET /api/pricing-models
pub async fn list_models(State(state): State<AppState>) -> Json<PricingModelsResponse> {
    Json(PricingModelsResponse {
        data: state.calculator.catalog().models().to_vec(),
    })
}

/// GET /api/pricing-models/:id
pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PricingModel>, AppError> {
    state
        .calculator
        .catalog()
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(AppError::PricingModelNotFound(id))
}

/// POST /api/calculate
///
/// Quotes `usage` against `model_id`, then records the calculation as a
/// `billing_calculation` usage event. Recording failures never affect the
/// returned quote.
pub async fn calculate(
    State(state): State<AppState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<Quote>, AppError> {
    let Json(request) = payload?;

    let model_id = request
        .model_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::ValidationError("model_id is required".to_string()))?;
    let usage = request
        .usage
        .ok_or_else(|| AppError::ValidationError("usage is required".to_string()))?;
    let usage = validate_quantity("usage", usage)?;

    let quote = state
        .calculator
        .quote(&model_id, usage)
        .ok_or_else(|| AppError::PricingModelNotFound(model_id.clone()))?;

    metrics::record_calculation(&quote.model_id, quote.total_cost);
    info!(
        model_id = %quote.model_id,
        usage = quote.usage,
        total_cost = quote.total_cost,
        tiers = quote.tier_breakdown.len(),
        "Calculated billing"
    );

    record_calculation_event(state.metering.as_ref(), &quote).await;

    Ok(Json(quote))
}

async fn record_calculation_event(metering: &dyn MeteringBackend, quote: &Quote) {
    let mut metadata = Map::new();
    metadata.insert("pricingModel".to_string(), json!(quote.model_id));
    metadata.insert("calculatedCost".to_string(), json!(quote.total_cost));

    let event = TrackEvent::new(BILLING_CALCULATION_EVENT, quote.usage, metadata);
    match metering.track_event(event).await {
        Ok(_) => metrics::record_event_tracked(BILLING_CALCULATION_EVENT),
        Err(e) => {
            metrics::record_metering_error("track_event");
            warn!(
                model_id = %quote.model_id,
                error = %e,
                "Failed to record billing calculation event"
            );
        }
    }
}
