use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Config,
    handlers::{self, AppState},
    metering, metrics,
    pricing::{CostCalculator, PricingCatalog},
    signals::shutdown_signal,
};

/// Start the demo server
///
/// This function:
/// 1. Initializes metrics
/// 2. Builds the calculator and metering backend
/// 3. Binds to the configured address
/// 4. Serves requests until SIGTERM/SIGINT
pub async fn start_server(config: Config, catalog: PricingCatalog) -> Result<()> {
    info!("Initializing Prometheus metrics...");
    let metrics_handle = Arc::new(metrics::init_metrics()?);

    let state = build_state(&config, catalog)?;
    let app = create_router(state.clone(), metrics_handle, config.server.cors_permissive);

    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .with_context(|| format!("Invalid server host '{}'", config.server.host))?,
        config.server.port,
    ));

    info!("Starting Usagey demo on {}", addr);
    info!(
        "Configuration: {} pricing models, {} metering, currency {}",
        state.calculator.catalog().len(),
        state.metering.mode().as_str(),
        state.calculator.currency()
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Build the shared handler state from configuration
pub fn build_state(config: &Config, catalog: PricingCatalog) -> Result<AppState> {
    let http_client = reqwest::Client::builder()
        .user_agent(concat!("usagey-demo/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let metering = metering::build_backend(http_client, &config.usagey)?;
    let calculator = CostCalculator::new(Arc::new(catalog), config.pricing.currency.clone());

    Ok(AppState::new(Arc::new(calculator), metering))
}

/// Create the Axum router with all routes and middleware
pub fn create_router(
    state: AppState,
    metrics_handle: Arc<PrometheusHandle>,
    cors_permissive: bool,
) -> Router {
    let api_routes = Router::new()
        .route("/ready", get(handlers::health::readiness_check))
        .route("/api/pricing-models", get(handlers::pricing::list_models))
        .route("/api/pricing-models/:id", get(handlers::pricing::get_model))
        .route("/api/calculate", post(handlers::pricing::calculate))
        .route("/api/track", post(handlers::usage::track))
        .route("/api/stats", get(handlers::usage::stats))
        .route("/api/events", get(handlers::usage::events))
        .with_state(state);

    let router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(metrics::metrics_endpoint))
        .with_state(metrics_handle)
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
