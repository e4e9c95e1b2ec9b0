use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde_json::{json, Map, Value};

use crate::metering::types::{EventQuery, TrackEvent, TrackEventResponse, UsageEvent, UsageStats};
use crate::metering::{MeteringBackend, MeteringError, MeteringMode};

/// Canned metering data for running the demo without an API key
#[derive(Debug, Clone, Default)]
pub struct MockMetering;

impl MockMetering {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MeteringBackend for MockMetering {
    fn mode(&self) -> MeteringMode {
        MeteringMode::Mock
    }

    async fn track_event(&self, _event: TrackEvent) -> Result<TrackEventResponse, MeteringError> {
        let now = Utc::now();
        Ok(TrackEventResponse {
            success: true,
            event_id: mock_event_id(now),
            timestamp: now,
            usage: Some(mock_usage_stats()),
        })
    }

    async fn usage_stats(&self) -> Result<UsageStats, MeteringError> {
        Ok(mock_usage_stats())
    }

    async fn usage_events(&self, query: &EventQuery) -> Result<Vec<UsageEvent>, MeteringError> {
        Ok(mock_usage_events(Utc::now())
            .into_iter()
            .filter(|event| query.matches(event))
            .take(query.limit as usize)
            .collect())
    }
}

/// `evt_<millis>_<8 random lowercase alphanumerics>`
pub fn mock_event_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect();
    format!("evt_{}_{}", now.timestamp_millis(), suffix)
}

pub fn mock_usage_stats() -> UsageStats {
    UsageStats {
        current_usage: 485.0,
        limit: 1000.0,
        percentage: 48.5,
        plan: "Starter".to_string(),
    }
}

/// Five sample events, newest first, five minutes apart
pub fn mock_usage_events(now: DateTime<Utc>) -> Vec<UsageEvent> {
    let samples = [
        ("evt_001", "api_call", 1.0, json!({"endpoint": "/users", "method": "GET"})),
        ("evt_002", "data_processing", 5.0, json!({"size": "2.5MB"})),
        ("evt_003", "storage", 10.0, json!({"fileCount": 3})),
        ("evt_004", "api_call", 1.0, json!({"endpoint": "/products", "method": "POST"})),
        ("evt_005", "compute", 3.0, json!({"duration": "5m"})),
    ];

    samples
        .into_iter()
        .enumerate()
        .map(|(idx, (id, event_type, quantity, metadata))| UsageEvent {
            id: id.to_string(),
            event_type: event_type.to_string(),
            quantity,
            timestamp: now - Duration::minutes(5 * (idx as i64 + 1)),
            metadata: into_map(metadata),
        })
        .collect()
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
