use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::UsageyConfig;
use crate::logging::SensitiveApiKey;
use crate::metering::types::{
    EventQuery, TrackEvent, TrackEventResponse, UsageEvent, UsageEventsResponse, UsageStats,
    UsageStatsResponse,
};
use crate::metering::{MeteringBackend, MeteringError, MeteringMode};

/// HTTP client for the Usagey metering API
#[derive(Clone)]
pub struct UsageyClient {
    http: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl UsageyClient {
    pub fn new(http: Client, config: &UsageyConfig) -> Result<Self, MeteringError> {
        if !config.has_api_key() {
            return Err(MeteringError::NotConfigured);
        }

        debug!(
            api_key = %SensitiveApiKey::new(&config.api_key),
            base_url = %config.base_url,
            "Creating Usagey client"
        );

        Ok(Self {
            http,
            api_key: config.api_key.trim().to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .timeout(self.timeout)
    }

    /// Send the request and decode a successful JSON body
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, MeteringError> {
        let response = self.authorized(builder).send().await?;

        // Check for HTTP errors
        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MeteringError::Upstream { status, message });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MeteringBackend for UsageyClient {
    fn mode(&self) -> MeteringMode {
        MeteringMode::Live
    }

    async fn track_event(&self, event: TrackEvent) -> Result<TrackEventResponse, MeteringError> {
        debug!(event_type = %event.event_type, quantity = event.quantity, "Tracking usage event");
        let builder = self.http.post(self.url("/api/v1/events")).json(&event);
        self.send(builder).await
    }

    async fn usage_stats(&self) -> Result<UsageStats, MeteringError> {
        let builder = self.http.get(self.url("/api/v1/usage/stats"));
        let response: UsageStatsResponse = self.send(builder).await?;
        Ok(response.usage)
    }

    async fn usage_events(&self, query: &EventQuery) -> Result<Vec<UsageEvent>, MeteringError> {
        let builder = self.http.get(self.url("/api/v1/usage/events")).query(query);
        let response: UsageEventsResponse = self.send(builder).await?;
        Ok(response.data)
    }
}
