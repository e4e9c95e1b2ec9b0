use anyhow::{bail, Result};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use usagey_demo::{
    config::{self, LegacyEnv},
    pricing::{CostCalculator, PricingCatalog, Quote},
};

/// Execute the calculate command
///
/// Quotes `usage` against `model_id` using the configured catalog. Nothing
/// is sent to the metering API.
pub fn execute(config_path: &Path, model_id: &str, usage: f64) -> Result<()> {
    if !usage.is_finite() || usage < 0.0 {
        bail!("Usage must be a non-negative number, got {}", usage);
    }

    let cfg = config::read_config(config_path, &LegacyEnv::from_process())?;
    let catalog = PricingCatalog::load(&cfg.pricing)?;
    let calculator = CostCalculator::new(Arc::new(catalog), cfg.pricing.currency.clone());

    let Some(quote) = calculator.quote(model_id, usage) else {
        let known: Vec<&str> = calculator
            .catalog()
            .models()
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        bail!(
            "Pricing model '{}' not found (available: {})",
            model_id,
            known.join(", ")
        );
    };

    info!(model_id = %quote.model_id, usage, total_cost = quote.total_cost, "Calculated billing");

    print_quote(&quote);
    Ok(())
}

fn print_quote(quote: &Quote) {
    println!(
        "{} {} ({})",
        "Quote for".green().bold(),
        quote.model_name.bold(),
        quote.strategy.to_string().cyan()
    );
    println!("  Usage: {}", quote.usage);
    println!();

    if quote.tier_breakdown.is_empty() {
        println!("  {}", "No usage charges".dimmed());
    } else {
        println!("{}", breakdown_table(quote));
    }
    println!();

    println!("  Base price: {}", format_amount(quote.base_price, &quote.currency));
    println!(
        "  {}: {}",
        "Total".bold(),
        format_amount(quote.total_cost, &quote.currency).green().bold()
    );
}

fn breakdown_table(quote: &Quote) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Tier").fg(Color::Cyan),
            Cell::new("Units").fg(Color::Cyan),
            Cell::new("Rate").fg(Color::Cyan),
            Cell::new("Cost").fg(Color::Cyan),
        ]);

    for item in &quote.tier_breakdown {
        table.add_row(vec![
            Cell::new(&item.tier),
            Cell::new(item.quantity).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.4}", item.rate)).set_alignment(CellAlignment::Right),
            Cell::new(format_amount(item.cost, &quote.currency)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

fn format_amount(amount: f64, currency: &str) -> String {
    format!("{:.2} {}", amount, currency)
}
