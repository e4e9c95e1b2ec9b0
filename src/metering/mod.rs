//! Usage-metering backends.
//!
//! Handlers talk to a [`MeteringBackend`] trait object so the live Usagey
//! client and the canned mock backend are interchangeable. Nothing in the
//! pricing module depends on this one.

pub mod client;
pub mod mock;
pub mod types;

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::UsageyConfig;

pub use client::UsageyClient;
pub use mock::MockMetering;
pub use types::{
    EventQuery, TrackEvent, TrackEventResponse, UsageEvent, UsageEventsResponse, UsageStats,
    UsageStatsResponse,
};

#[derive(Debug, Error)]
pub enum MeteringError {
    #[error("Usagey API key is not defined. Please set USAGEY_API_KEY environment variable.")]
    NotConfigured,

    #[error("request to metering API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("metering API returned {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("unexpected metering API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Which backend is answering requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeteringMode {
    Live,
    Mock,
}

impl MeteringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Mock => "mock",
        }
    }
}

/// Records usage events and reports usage for the account
#[async_trait]
pub trait MeteringBackend: Send + Sync + 'static {
    fn mode(&self) -> MeteringMode;

    async fn track_event(&self, event: TrackEvent) -> Result<TrackEventResponse, MeteringError>;

    async fn usage_stats(&self) -> Result<UsageStats, MeteringError>;

    async fn usage_events(&self, query: &EventQuery) -> Result<Vec<UsageEvent>, MeteringError>;
}

/// Pick the backend described by configuration
pub fn build_backend(
    http_client: reqwest::Client,
    config: &UsageyConfig,
) -> Result<Arc<dyn MeteringBackend>, MeteringError> {
    if config.use_mock_data {
        info!("Using mock metering data");
        return Ok(Arc::new(MockMetering::new()));
    }

    let client = UsageyClient::new(http_client, config)?;
    info!(base_url = %client.base_url(), "Using live Usagey metering API");
    Ok(Arc::new(client))
}
