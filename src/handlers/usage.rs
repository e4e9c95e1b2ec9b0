use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{validate_quantity, AppState};
use crate::error::AppError;
use crate::metering::{
    EventQuery, TrackEvent, TrackEventResponse, UsageEventsResponse, UsageStatsResponse,
};
use crate::metrics;

fn default_quantity() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Raw query string of `GET /api/events`; parsed leniently below
#[derive(Debug, Default, Deserialize)]
pub struct EventsParams {
    pub event_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
}

/// POST /api/track
pub async fn track(
    State(state): State<AppState>,
    payload: Result<Json<TrackRequest>, JsonRejection>,
) -> Result<Json<TrackEventResponse>, AppError> {
    let Json(request) = payload?;

    let event_type = request
        .event_type
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::ValidationError("event_type is required".to_string()))?;
    let quantity = validate_quantity("quantity", request.quantity)?;

    let mut metadata = request.metadata;
    let request_id = Uuid::new_v4().to_string()[..8].to_string();
    metadata.insert("request_id".to_string(), json!(request_id));
    metadata.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));

    debug!(event_type = %event_type, quantity, request_id = %request_id, "Tracking usage event");

    let event = TrackEvent::new(event_type.clone(), quantity, metadata);
    let response = state.metering.track_event(event).await.map_err(|e| {
        metrics::record_metering_error("track_event");
        warn!(event_type = %event_type, error = %e, "Failed to track usage event");
        AppError::Metering(e)
    })?;

    metrics::record_event_tracked(&event_type);
    Ok(Json(response))
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<UsageStatsResponse>, AppError> {
    let usage = state.metering.usage_stats().await.map_err(|e| {
        metrics::record_metering_error("usage_stats");
        warn!(error = %e, "Failed to fetch usage stats");
        AppError::Metering(e)
    })?;

    Ok(Json(UsageStatsResponse { usage }))
}

/// GET /api/events
pub async fn events(
    State(state): State<AppState>,
    Query(params): Query<EventsParams>,
) -> Result<Json<UsageEventsResponse>, AppError> {
    let query = build_event_query(params)?;

    let data = state.metering.usage_events(&query).await.map_err(|e| {
        metrics::record_metering_error("usage_events");
        warn!(error = %e, "Failed to fetch usage events");
        AppError::Metering(e)
    })?;

    Ok(Json(UsageEventsResponse { data }))
}

fn build_event_query(params: EventsParams) -> Result<EventQuery, AppError> {
    Ok(EventQuery {
        event_type: params
            .event_type
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
        start_date: parse_date("start_date", params.start_date.as_deref())?,
        end_date: parse_date("end_date", params.end_date.as_deref())?,
        limit: EventQuery::parse_limit(params.limit.as_deref()),
    })
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC)
fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    let raw = match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return Ok(None),
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(timestamp.with_timezone(&Utc)));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| {
            AppError::ValidationError(format!(
                "{} must be an RFC 3339 timestamp or YYYY-MM-DD date",
                field
            ))
        })
}
