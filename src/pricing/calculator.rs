use crate::pricing::catalog::PricingCatalog;
use crate::pricing::models::{PricingModel, PricingStrategy, Quote, Tier, TierLineItem};
use std::sync::Arc;

/// Compute the total cost of `usage` under `model`.
///
/// Always equals `base_price` plus the summed costs of
/// [`compute_breakdown`] for the same inputs.
pub fn compute_cost(model: &PricingModel, usage: f64) -> f64 {
    total_from_breakdown(model.base_price, &compute_breakdown(model, usage))
}

/// Itemize `usage` per tier, in tier order.
///
/// Tiers that receive no usage are omitted, so zero usage yields an empty
/// breakdown.
pub fn compute_breakdown(model: &PricingModel, usage: f64) -> Vec<TierLineItem> {
    match model.strategy {
        PricingStrategy::FlatRate => flat_rate_breakdown(&model.tiers, usage),
        PricingStrategy::Tiered | PricingStrategy::Hybrid => graduated_breakdown(&model.tiers, usage),
    }
}

fn total_from_breakdown(base_price: f64, breakdown: &[TierLineItem]) -> f64 {
    base_price + breakdown.iter().map(|item| item.cost).sum::<f64>()
}

/// Flat rate ignores tier bounds and flat fees
fn flat_rate_breakdown(tiers: &[Tier], usage: f64) -> Vec<TierLineItem> {
    let Some(tier) = tiers.first() else {
        return Vec::new();
    };

    if usage <= 0.0 {
        return Vec::new();
    }

    vec![TierLineItem {
        tier: tier.name.clone(),
        quantity: usage,
        rate: tier.price_per_unit,
        cost: usage * tier.price_per_unit,
    }]
}

/// Consume usage tier by tier until it runs out.
///
/// Usage beyond a finite last tier stays unallocated and is not charged.
fn graduated_breakdown(tiers: &[Tier], usage: f64) -> Vec<TierLineItem> {
    let mut remaining = usage;
    let mut breakdown = Vec::new();

    for tier in tiers {
        if remaining <= 0.0 {
            break;
        }

        let allocated = remaining.min(tier.capacity());
        if allocated <= 0.0 {
            continue;
        }

        breakdown.push(TierLineItem {
            tier: tier.name.clone(),
            quantity: allocated,
            rate: tier.price_per_unit,
            cost: allocated * tier.price_per_unit + tier.flat_fee,
        });

        remaining -= allocated;
    }

    breakdown
}

/// Calculator bound to a pricing catalog
pub struct CostCalculator {
    catalog: Arc<PricingCatalog>,
    currency: String,
}

impl CostCalculator {
    /// Create a new cost calculator
    pub fn new(catalog: Arc<PricingCatalog>, currency: impl Into<String>) -> Self {
        Self {
            catalog,
            currency: currency.into(),
        }
    }

    pub fn catalog(&self) -> &PricingCatalog {
        &self.catalog
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Quote `usage` against the model with `model_id`.
    /// Returns `None` when no such model exists.
    pub fn quote(&self, model_id: &str, usage: f64) -> Option<Quote> {
        self.catalog
            .get(model_id)
            .map(|model| self.quote_model(model, usage))
    }

    /// Quote `usage` against an already resolved model
    pub fn quote_model(&self, model: &PricingModel, usage: f64) -> Quote {
        let tier_breakdown = compute_breakdown(model, usage);
        let total_cost = total_from_breakdown(model.base_price, &tier_breakdown);

        Quote {
            model_id: model.id.clone(),
            model_name: model.name.clone(),
            strategy: model.strategy,
            usage,
            base_price: model.base_price,
            total_cost,
            currency: self.currency.clone(),
            tier_breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn tier(id: u32, name: &str, start: u64, end: Option<u64>, price: f64, fee: f64) -> Tier {
        Tier {
            id,
            name: name.to_string(),
            start_quantity: start,
            end_quantity: end,
            price_per_unit: price,
            flat_fee: fee,
        }
    }

    fn model(id: &str, strategy: PricingStrategy, base_price: f64, tiers: Vec<Tier>) -> PricingModel {
        PricingModel {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            strategy,
            base_price,
            tiers,
        }
    }

    fn flat_rate() -> PricingModel {
        model(
            "per-unit",
            PricingStrategy::FlatRate,
            10.0,
            vec![tier(1, "All Units", 0, None, 0.01, 0.0)],
        )
    }

    fn tiered() -> PricingModel {
        model(
            "tiered",
            PricingStrategy::Tiered,
            0.0,
            vec![
                tier(1, "Tier 1", 0, Some(1000), 0.02, 0.0),
                tier(2, "Tier 2", 1001, Some(10000), 0.01, 0.0),
                tier(3, "Tier 3", 10001, None, 0.005, 0.0),
            ],
        )
    }

    fn hybrid() -> PricingModel {
        model(
            "hybrid",
            PricingStrategy::Hybrid,
            49.99,
            vec![
                tier(1, "Included", 0, Some(5000), 0.0, 0.0),
                tier(2, "Overage", 5001, None, 0.008, 0.0),
            ],
        )
    }

    fn with_fees() -> PricingModel {
        model(
            "fees",
            PricingStrategy::Tiered,
            5.0,
            vec![
                tier(1, "Starter", 0, Some(100), 0.1, 1.0),
                tier(2, "Growth", 101, Some(200), 0.05, 2.5),
                tier(3, "Scale", 201, None, 0.01, 4.0),
            ],
        )
    }

    fn sample_usages() -> Vec<f64> {
        let mut usages: Vec<f64> = (0..=400).map(|i| i as f64 * 37.5).collect();
        usages.extend([0.5, 999.0, 1000.0, 1000.5, 1001.0, 5000.0, 5001.0, 10000.0, 10001.0, 250_000.0]);
        usages
    }

    #[test]
    fn test_flat_rate_scenario() {
        assert_close(compute_cost(&flat_rate(), 500.0), 15.0);
    }

    #[test]
    fn test_tiered_scenario() {
        let model = tiered();
        assert_close(compute_cost(&model, 5000.0), 60.0);

        let breakdown = compute_breakdown(&model, 5000.0);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].tier, "Tier 1");
        assert_eq!(breakdown[0].quantity, 1000.0);
        assert_close(breakdown[0].cost, 20.0);
        assert_eq!(breakdown[1].tier, "Tier 2");
        assert_eq!(breakdown[1].quantity, 4000.0);
        assert_close(breakdown[1].cost, 40.0);
    }

    #[test]
    fn test_hybrid_scenario() {
        let model = hybrid();
        assert_close(compute_cost(&model, 7500.0), 69.99);

        let breakdown = compute_breakdown(&model, 7500.0);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].quantity, 5000.0);
        assert_eq!(breakdown[0].cost, 0.0);
        assert_eq!(breakdown[1].tier, "Overage");
        assert_eq!(breakdown[1].quantity, 2500.0);
        assert_close(breakdown[1].cost, 20.0);
    }

    #[test]
    fn test_hybrid_within_allowance_costs_base_price() {
        assert_close(compute_cost(&hybrid(), 5000.0), 49.99);
        assert_close(compute_cost(&hybrid(), 5001.0), 49.99 + 0.008);
    }

    #[test]
    fn test_zero_usage_costs_base_price_with_empty_breakdown() {
        for model in [flat_rate(), tiered(), hybrid(), with_fees()] {
            assert_eq!(compute_cost(&model, 0.0), model.base_price);
            assert!(compute_breakdown(&model, 0.0).is_empty(), "model {}", model.id);
        }
    }

    #[test]
    fn test_flat_rate_matches_formula() {
        let model = flat_rate();
        for usage in sample_usages() {
            assert_close(compute_cost(&model, usage), 10.0 + usage * 0.01);
        }
    }

    #[test]
    fn test_flat_rate_ignores_bounds_and_fee() {
        let model = model(
            "bounded",
            PricingStrategy::FlatRate,
            1.0,
            vec![tier(1, "Only", 0, Some(10), 2.0, 100.0)],
        );

        assert_close(compute_cost(&model, 50.0), 101.0);
        let breakdown = compute_breakdown(&model, 50.0);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].quantity, 50.0);
    }

    #[test]
    fn test_cost_is_monotonic_in_usage() {
        for model in [tiered(), hybrid(), with_fees()] {
            let mut previous = f64::NEG_INFINITY;
            let mut usages = sample_usages();
            usages.sort_by(|a, b| a.partial_cmp(b).unwrap());

            for usage in usages {
                let cost = compute_cost(&model, usage);
                assert!(
                    cost >= previous - 1e-9,
                    "model {} decreased at usage {usage}: {previous} -> {cost}",
                    model.id
                );
                previous = cost;
            }
        }
    }

    #[test]
    fn test_breakdown_sums_to_total_exactly() {
        for model in [flat_rate(), tiered(), hybrid(), with_fees()] {
            for usage in sample_usages() {
                let breakdown = compute_breakdown(&model, usage);
                let summed = model.base_price + breakdown.iter().map(|item| item.cost).sum::<f64>();
                assert_eq!(summed, compute_cost(&model, usage));
            }
        }
    }

    #[test]
    fn test_allocated_quantity_never_exceeds_usage() {
        for model in [tiered(), hybrid(), with_fees()] {
            for usage in sample_usages() {
                let allocated: f64 = compute_breakdown(&model, usage)
                    .iter()
                    .map(|item| item.quantity)
                    .sum();
                // Trailing unbounded tier absorbs everything
                assert_close(allocated, usage);
            }
        }
    }

    #[test]
    fn test_finite_last_tier_leaves_excess_uncharged() {
        let model = model(
            "capped",
            PricingStrategy::Tiered,
            0.0,
            vec![
                tier(1, "First", 0, Some(100), 1.0, 0.0),
                tier(2, "Second", 101, Some(150), 2.0, 0.0),
            ],
        );

        let breakdown = compute_breakdown(&model, 1000.0);
        let allocated: f64 = breakdown.iter().map(|item| item.quantity).sum();
        assert_eq!(allocated, 150.0);
        assert_close(compute_cost(&model, 1000.0), 100.0 + 100.0);
    }

    #[test]
    fn test_flat_fee_charged_once_per_touched_tier() {
        let model = with_fees();

        // Only the first tier is touched
        assert_close(compute_cost(&model, 50.0), 5.0 + 50.0 * 0.1 + 1.0);

        // First two tiers
        assert_close(compute_cost(&model, 150.0), 5.0 + 100.0 * 0.1 + 1.0 + 50.0 * 0.05 + 2.5);

        // All three tiers
        let expected = 5.0 + 10.0 + 1.0 + 5.0 + 2.5 + 300.0 * 0.01 + 4.0;
        assert_close(compute_cost(&model, 500.0), expected);
    }

    #[test]
    fn test_zero_width_tier_is_skipped_without_fee() {
        let model = model(
            "zero-width",
            PricingStrategy::Tiered,
            0.0,
            vec![
                tier(1, "Empty", 0, Some(0), 1.0, 50.0),
                tier(2, "Rest", 1, None, 0.5, 0.0),
            ],
        );

        let breakdown = compute_breakdown(&model, 10.0);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].tier, "Rest");
        assert_close(compute_cost(&model, 10.0), 5.0);
    }

    #[test]
    fn test_fractional_usage() {
        let breakdown = compute_breakdown(&tiered(), 1000.5);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[1].quantity, 0.5);
        assert_close(compute_cost(&tiered(), 1000.5), 20.005);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let model = with_fees();
        let first = (compute_cost(&model, 321.25), compute_breakdown(&model, 321.25));
        for _ in 0..10 {
            assert_eq!((compute_cost(&model, 321.25), compute_breakdown(&model, 321.25)), first);
        }
    }

    #[test]
    fn test_model_without_tiers_charges_base_price() {
        let empty = model("empty", PricingStrategy::FlatRate, 3.0, Vec::new());
        assert_eq!(compute_cost(&empty, 100.0), 3.0);

        let empty = model("empty", PricingStrategy::Tiered, 3.0, Vec::new());
        assert_eq!(compute_cost(&empty, 100.0), 3.0);
    }

    #[test]
    fn test_calculator_quote() {
        let calculator = CostCalculator::new(Arc::new(PricingCatalog::builtin()), "USD");

        let quote = calculator.quote("tiered", 5000.0).unwrap();
        assert_eq!(quote.model_id, "tiered");
        assert_eq!(quote.model_name, "Tiered");
        assert_eq!(quote.strategy, PricingStrategy::Tiered);
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.usage, 5000.0);
        assert_close(quote.total_cost, 60.0);
        assert_eq!(quote.tier_breakdown.len(), 2);

        assert!(calculator.quote("nonexistent", 5000.0).is_none());
    }

    #[test]
    fn test_calculator_quote_agrees_with_compute_cost() {
        let calculator = CostCalculator::new(Arc::new(PricingCatalog::builtin()), "EUR");

        for model in calculator.catalog().models() {
            for usage in sample_usages() {
                let quote = calculator.quote_model(model, usage);
                assert_eq!(quote.total_cost, compute_cost(model, usage));
                assert_eq!(quote.currency, "EUR");
            }
        }
    }
}
