use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use std::path::Path;
use usagey_demo::{
    config::{self, LegacyEnv},
    pricing::{PricingCatalog, PricingModel},
};

/// Execute the models command
///
/// Prints every pricing model with its tiers
pub fn execute(config_path: &Path) -> Result<()> {
    // Listing models needs no API key, so the config is read without validation
    let cfg = config::read_config(config_path, &LegacyEnv::from_process())?;
    let catalog = PricingCatalog::load(&cfg.pricing)?;

    println!("{}", "Pricing Models:".green().bold());
    println!();

    for model in catalog.models() {
        println!(
            "{} {} ({})",
            model.name.bold(),
            format!("[{}]", model.id).dimmed(),
            model.strategy.to_string().cyan()
        );
        if !model.description.is_empty() {
            println!("  {}", model.description);
        }
        println!("  Base price: {:.2} {}", model.base_price, cfg.pricing.currency);
        println!("{}", tier_table(model));
        println!();
    }

    Ok(())
}

fn tier_table(model: &PricingModel) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Tier").fg(Color::Cyan),
            Cell::new("Range").fg(Color::Cyan),
            Cell::new("Price / Unit").fg(Color::Cyan),
            Cell::new("Flat Fee").fg(Color::Cyan),
        ]);

    for tier in &model.tiers {
        let range = match tier.end_quantity {
            Some(end) => format!("{} - {}", tier.start_quantity, end),
            None => format!("{}+", tier.start_quantity),
        };
        table.add_row(vec![
            Cell::new(&tier.name),
            Cell::new(range),
            Cell::new(format!("{:.4}", tier.price_per_unit)),
            Cell::new(format!("{:.2}", tier.flat_fee)),
        ]);
    }

    table
}
