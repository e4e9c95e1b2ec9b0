use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use tracing::info;
use usagey_demo::{config, init_tracing, pricing::PricingCatalog, server};

/// Execute the start command
///
/// This will:
/// 1. Load configuration
/// 2. Initialize tracing in the configured format
/// 3. Load the pricing catalog
/// 4. Start the server
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting Usagey demo server...".green());

    let cfg = config::load_config(config_path)?;
    init_tracing(&cfg.server.log_format);

    info!(config = %config_path.display(), "Configuration loaded");

    let catalog = PricingCatalog::load(&cfg.pricing)?;

    // Blocks until shutdown
    server::start_server(cfg, catalog).await?;

    Ok(())
}
