use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;

/// Install the global Prometheus recorder
///
/// Fails if a recorder is already installed (e.g. in tests).
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "billing_calculations_total",
        "Total number of billing calculations"
    );
    describe_histogram!(
        "billing_calculated_cost",
        "Distribution of calculated costs"
    );
    describe_counter!(
        "usage_events_tracked_total",
        "Total number of usage events forwarded to the metering backend"
    );
    describe_counter!(
        "metering_errors_total",
        "Total number of failed metering backend calls"
    );
    describe_gauge!("usagey_demo_info", "Service version information");

    gauge!("usagey_demo_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a completed billing calculation
pub fn record_calculation(model_id: &str, total_cost: f64) {
    counter!("billing_calculations_total", "model" => model_id.to_string()).increment(1);
    histogram!("billing_calculated_cost", "model" => model_id.to_string()).record(total_cost);
}

/// Record a usage event accepted by the metering backend
pub fn record_event_tracked(event_type: &str) {
    counter!("usage_events_tracked_total", "event_type" => event_type.to_string()).increment(1);
}

/// Record a failed metering call
pub fn record_metering_error(operation: &str) {
    counter!("metering_errors_total", "operation" => operation.to_string()).increment(1);
}

/// Handle /metrics endpoint
pub async fn metrics_endpoint(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}
