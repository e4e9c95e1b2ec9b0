pub mod calculator;
pub mod catalog;
pub mod models;

pub use calculator::{compute_breakdown, compute_cost, CostCalculator};
pub use catalog::{CatalogError, PricingCatalog};
pub use models::{PricingModel, PricingStrategy, Quote, Tier, TierLineItem};
