use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account usage against its plan limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub current_usage: f64,
    pub limit: f64,
    pub percentage: f64,
    pub plan: String,
}

impl Default for UsageStats {
    fn default() -> Self {
        Self {
            current_usage: 0.0,
            limit: 1000.0,
            percentage: 0.0,
            plan: "Free".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    pub id: String,
    pub event_type: String,
    pub quantity: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Event submitted to the metering API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackEvent {
    pub event_type: String,
    pub quantity: f64,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl TrackEvent {
    pub fn new(event_type: impl Into<String>, quantity: f64, metadata: Map<String, Value>) -> Self {
        Self {
            event_type: event_type.into(),
            quantity,
            metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackEventResponse {
    pub success: bool,
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageStats>,
}

/// `{"usage": {...}}`, the shape of the stats endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStatsResponse {
    pub usage: UsageStats,
}

/// `{"data": [...]}`, the shape of the events endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEventsResponse {
    pub data: Vec<UsageEvent>,
}

/// Filters for listing recent events
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    pub limit: u32,
}

impl EventQuery {
    pub const DEFAULT_LIMIT: u32 = 50;
    pub const MAX_LIMIT: u32 = 1000;

    /// Parse a user-supplied limit: unparseable or zero falls back to the
    /// default, anything above the maximum is clamped.
    pub fn parse_limit(raw: Option<&str>) -> u32 {
        match raw.and_then(|value| value.trim().parse::<u32>().ok()) {
            Some(0) | None => Self::DEFAULT_LIMIT,
            Some(limit) => limit.min(Self::MAX_LIMIT),
        }
    }

    pub fn matches(&self, event: &UsageEvent) -> bool {
        if let Some(event_type) = &self.event_type {
            if &event.event_type != event_type {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if event.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if event.timestamp > end {
                return false;
            }
        }
        true
    }
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            event_type: None,
            start_date: None,
            end_date: None,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
