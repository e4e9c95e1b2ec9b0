use serde::{Deserialize, Serialize};
use std::fmt;

/// Pricing strategy carried by every model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingStrategy {
    /// Single tier applied uniformly to all usage
    FlatRate,
    /// Usage consumed tier by tier at decreasing rates
    Tiered,
    /// Base fee with an included allowance, then overage tiers
    Hybrid,
}

impl PricingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlatRate => "flat_rate",
            Self::Tiered => "tiered",
            Self::Hybrid => "hybrid",
        }
    }

    /// Whether usage is allocated across tier boundaries
    pub fn is_tier_based(&self) -> bool {
        matches!(self, Self::Tiered | Self::Hybrid)
    }
}

impl fmt::Display for PricingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contiguous usage range with its own rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub id: u32,
    pub name: String,
    /// Inclusive lower bound
    pub start_quantity: u64,
    /// Inclusive upper bound, `None` means unbounded
    #[serde(default)]
    pub end_quantity: Option<u64>,
    pub price_per_unit: f64,
    /// Charged once when any usage lands in this tier
    #[serde(default)]
    pub flat_fee: f64,
}

impl Tier {
    /// Number of usage units this tier can absorb.
    ///
    /// Units are numbered from 1, so a tier starting at 0 covers `1..=end`
    /// and any other tier covers `start..=end`.
    pub fn capacity(&self) -> f64 {
        match self.end_quantity {
            None => f64::INFINITY,
            Some(end) => {
                let first_unit = self.start_quantity.max(1);
                if end < first_unit {
                    0.0
                } else {
                    (end - first_unit + 1) as f64
                }
            }
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.end_quantity.is_none()
    }
}

/// Static pricing model definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub strategy: PricingStrategy,
    pub base_price: f64,
    pub tiers: Vec<Tier>,
}

/// One line of a cost breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierLineItem {
    pub tier: String,
    pub quantity: f64,
    pub rate: f64,
    pub cost: f64,
}

/// Total cost plus its per-tier breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub model_id: String,
    pub model_name: String,
    pub strategy: PricingStrategy,
    pub usage: f64,
    pub base_price: f64,
    pub total_cost: f64,
    pub currency: String,
    pub tier_breakdown: Vec<TierLineItem>,
}
