//! Quote engine for stump grinding jobs
//!
//! Each stump is priced in sequence order:
//! - base: diameter x rate per inch, with a 20% volume discount on every stump after the first
//! - add-ons: root chasing, deep grind and narrow access, never discounted
//! - haul-away: estimated chip weight to landfill plus handling, floored at the haul minimum
//!
//! The job subtotal gets the flat access fee and is then floored at the
//! minimum call-out fee. The floor replaces the subtotal; line prices are
//! reported unadjusted, so they can sum to less than the subtotal.

use crate::core::{Job, PricingConfig, QuoteResult, Stump};
use std::collections::HashMap;
use std::f64::consts::PI;

/// Price multiplier for every stump after the first
pub const VOLUME_DISCOUNT_FACTOR: f64 = 0.8;
/// Grind depth in inches for a standard grind
pub const STANDARD_GRIND_DEPTH_IN: f64 = 6.0;
/// Grind depth in inches when deep grind is selected
pub const DEEP_GRIND_DEPTH_IN: f64 = 8.0;
/// Cubic inches per cubic foot
pub const CUBIC_INCHES_PER_CUBIC_FOOT: f64 = 1728.0;
/// Metric tonnes per pound
pub const TONNES_PER_POUND: f64 = 0.000453592;

/// Compute the quote for a job. Pure: reads its inputs, allocates its output.
pub fn compute_quote(job: &Job, config: &PricingConfig) -> QuoteResult {
    let mut subtotal = 0.0;
    let mut haul_weight_tonnes = 0.0;
    let mut stump_prices = HashMap::with_capacity(job.stumps.len());

    for (index, stump) in job.stumps.iter().enumerate() {
        let line = price_stump(stump, index, config);

        haul_weight_tonnes += line.haul_weight_tonnes;
        stump_prices.insert(stump.id.clone(), line.price);
        subtotal += line.price;
    }

    subtotal += job.access_fee;

    if subtotal < config.min_call_out_fee {
        subtotal = config.min_call_out_fee;
    }

    let tax_amount = if config.tax_enabled {
        subtotal * config.tax_rate
    } else {
        0.0
    };

    QuoteResult {
        subtotal,
        tax_amount,
        total: subtotal + tax_amount,
        stump_prices,
        haul_weight_tonnes,
    }
}

/// Price and chip weight of a single stump line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StumpLine {
    pub price: f64,
    /// Zero unless the stump is hauled away
    pub haul_weight_tonnes: f64,
}

/// Price one stump given its position in the job
pub fn price_stump(stump: &Stump, index: usize, config: &PricingConfig) -> StumpLine {
    let discount = if index == 0 { 1.0 } else { VOLUME_DISCOUNT_FACTOR };

    let mut price = stump.diameter * config.base_rate_per_inch * discount;

    if stump.root_chasing_ft > 0.0 {
        price += stump.root_chasing_ft * config.root_rate;
    }
    if stump.deep_grind {
        price += config.deep_grind_fee;
    }
    if stump.access_issue {
        price += config.narrow_access_fee;
    }

    let mut haul_weight_tonnes = 0.0;
    if stump.haul_away {
        haul_weight_tonnes = chip_weight_tonnes(
            stump.diameter,
            stump.deep_grind,
            config.chip_density_lbs_per_cubic_ft,
        );
        price += haul_cost(haul_weight_tonnes, config);
    }

    StumpLine {
        price,
        haul_weight_tonnes,
    }
}

/// Estimate ground chip weight, treating the grind as a cylinder of the
/// stump's diameter and the grind depth
pub fn chip_weight_tonnes(diameter: f64, deep_grind: bool, density_lbs_per_cubic_ft: f64) -> f64 {
    let radius = diameter / 2.0;
    let depth = if deep_grind {
        DEEP_GRIND_DEPTH_IN
    } else {
        STANDARD_GRIND_DEPTH_IN
    };

    let cubic_inches = PI * radius * radius * depth;
    let cubic_feet = cubic_inches / CUBIC_INCHES_PER_CUBIC_FOOT;
    let pounds = cubic_feet * density_lbs_per_cubic_ft;

    pounds * TONNES_PER_POUND
}

/// Haul-away charge: disposal plus handling, never below the haul minimum
pub fn haul_cost(weight_tonnes: f64, config: &PricingConfig) -> f64 {
    let disposal = weight_tonnes * config.landfill_rate_per_tonne;
    config.haul_min_fee.max(disposal + config.haul_handling_fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Config with every add-on zeroed so each test opts into what it checks
    fn bare_config() -> PricingConfig {
        PricingConfig {
            base_rate_per_inch: 9.0,
            min_call_out_fee: 0.0,
            tax_rate: 0.13,
            tax_enabled: false,
            root_rate: 0.0,
            deep_grind_fee: 0.0,
            haul_handling_fee: 0.0,
            haul_min_fee: 0.0,
            landfill_rate_per_tonne: 0.0,
            narrow_access_fee: 0.0,
            ..Default::default()
        }
    }

    fn stump(diameter: f64) -> Stump {
        Stump {
            diameter,
            ..Stump::new(None)
        }
    }

    fn job_with(stumps: Vec<Stump>) -> Job {
        Job {
            stumps,
            ..Job::new()
        }
    }

    #[test]
    fn test_single_stump_uses_call_out_floor() {
        let config = PricingConfig {
            min_call_out_fee: 150.0,
            ..bare_config()
        };

        let small = compute_quote(&job_with(vec![stump(10.0)]), &config);
        assert_eq!(small.subtotal, 150.0);

        let large = compute_quote(&job_with(vec![stump(20.0)]), &config);
        assert_eq!(large.subtotal, 180.0);
    }

    #[test]
    fn test_volume_discount_after_first_stump() {
        let job = job_with(vec![stump(20.0), stump(20.0)]);
        let quote = compute_quote(&job, &bare_config());

        assert_eq!(quote.subtotal, 324.0);
        assert_eq!(quote.stump_prices[&job.stumps[0].id], 180.0);
        assert_eq!(quote.stump_prices[&job.stumps[1].id], 144.0);
    }

    #[test]
    fn test_discount_follows_sequence_order() {
        let job = job_with(vec![stump(10.0), stump(30.0)]);
        let quote = compute_quote(&job, &bare_config());
        assert_eq!(quote.subtotal, 90.0 + 216.0);

        let reversed = job_with(vec![job.stumps[1].clone(), job.stumps[0].clone()]);
        let quote = compute_quote(&reversed, &bare_config());
        assert_eq!(quote.subtotal, 270.0 + 72.0);
    }

    #[test]
    fn test_add_ons_are_not_discounted() {
        let config = PricingConfig {
            root_rate: 8.0,
            deep_grind_fee: 40.0,
            ..bare_config()
        };
        let second = Stump {
            root_chasing_ft: 5.0,
            deep_grind: true,
            ..stump(10.0)
        };
        let job = job_with(vec![stump(20.0), second]);

        let quote = compute_quote(&job, &config);
        assert_eq!(quote.stump_prices[&job.stumps[1].id], 152.0);
    }

    #[test]
    fn test_negative_root_footage_adds_nothing() {
        let config = PricingConfig {
            root_rate: 8.0,
            ..bare_config()
        };
        let line = price_stump(
            &Stump {
                root_chasing_ft: -3.0,
                ..stump(10.0)
            },
            0,
            &config,
        );
        assert_eq!(line.price, 90.0);
    }

    #[test]
    fn test_narrow_access_fee() {
        let config = PricingConfig {
            narrow_access_fee: 25.0,
            ..bare_config()
        };
        let line = price_stump(
            &Stump {
                access_issue: true,
                ..stump(10.0)
            },
            3,
            &config,
        );
        assert_eq!(line.price, 72.0 + 25.0);
    }

    #[test]
    fn test_chip_weight_cylinder() {
        // 12" stump, 6" deep: pi * 36 * 6 in^3 = 0.3927 ft^3
        let tonnes = chip_weight_tonnes(12.0, false, 12.0);
        let expected = PI * 36.0 * 6.0 / 1728.0 * 12.0 * 0.000453592;
        assert!((tonnes - expected).abs() < 1e-12);

        let deep = chip_weight_tonnes(12.0, true, 12.0);
        assert!((deep / tonnes - 8.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_haul_floor_applies_to_disposal_plus_handling() {
        let config = PricingConfig {
            haul_handling_fee: 2.0,
            haul_min_fee: 15.0,
            landfill_rate_per_tonne: 75.0,
            ..bare_config()
        };

        // A few kilograms of chips cost cents to dispose of
        let weight = chip_weight_tonnes(10.0, false, 12.0);
        assert!(weight * 75.0 + 2.0 < 15.0);
        assert_eq!(haul_cost(weight, &config), 15.0);

        let line = price_stump(
            &Stump {
                haul_away: true,
                ..stump(10.0)
            },
            0,
            &config,
        );
        assert_eq!(line.price, 90.0 + 15.0);
        assert_eq!(line.haul_weight_tonnes, weight);
    }

    #[test]
    fn test_haul_above_floor_uses_weight() {
        let config = PricingConfig {
            haul_handling_fee: 20.0,
            haul_min_fee: 15.0,
            landfill_rate_per_tonne: 75.0,
            ..bare_config()
        };
        let weight = chip_weight_tonnes(30.0, true, 12.0);
        let cost = haul_cost(weight, &config);
        assert!((cost - (weight * 75.0 + 20.0)).abs() < 1e-12);
        assert!(cost > 20.0);
    }

    #[test]
    fn test_call_out_floor_overrides_and_breakdown_is_not_reconciled() {
        let config = PricingConfig {
            min_call_out_fee: 150.0,
            ..bare_config()
        };
        let job = Job {
            access_fee: 10.0,
            ..job_with(vec![stump(5.0), stump(5.0)])
        };

        let quote = compute_quote(&job, &config);
        // 45 + 36 + 10 = 91, replaced by the floor rather than topped up
        assert_eq!(quote.subtotal, 150.0);
        assert_eq!(quote.line_item_sum(), 81.0);
        assert!(quote.line_item_sum() < quote.subtotal);
    }

    #[test]
    fn test_access_fee_added_once() {
        let job = Job {
            access_fee: 30.0,
            ..job_with(vec![stump(20.0), stump(20.0)])
        };
        let quote = compute_quote(&job, &bare_config());
        assert_eq!(quote.subtotal, 354.0);
        assert_eq!(quote.line_item_sum(), 324.0);
    }

    #[test]
    fn test_tax_on_post_floor_subtotal() {
        let config = PricingConfig {
            min_call_out_fee: 200.0,
            tax_enabled: true,
            tax_rate: 0.25,
            ..bare_config()
        };
        let quote = compute_quote(&job_with(vec![stump(10.0)]), &config);
        assert_eq!(quote.subtotal, 200.0);
        assert_eq!(quote.tax_amount, 50.0);
        assert_eq!(quote.total, 250.0);
    }

    #[test]
    fn test_tax_disabled() {
        let config = PricingConfig {
            tax_enabled: false,
            tax_rate: 0.13,
            ..PricingConfig::default()
        };
        let mut job = Job::new();
        job.add_stump();
        job.stumps[1].haul_away = true;

        let quote = compute_quote(&job, &config);
        assert_eq!(quote.tax_amount, 0.0);
        assert_eq!(quote.total, quote.subtotal);
    }

    #[test]
    fn test_idempotent() {
        let mut job = Job::new();
        job.add_stump();
        job.stumps[0].haul_away = true;
        job.stumps[1].deep_grind = true;
        job.stumps[1].haul_away = true;
        job.stumps[1].root_chasing_ft = 3.5;
        let config = PricingConfig::default();

        let first = compute_quote(&job, &config);
        let second = compute_quote(&job, &config);

        assert_eq!(first.subtotal.to_bits(), second.subtotal.to_bits());
        assert_eq!(first.tax_amount.to_bits(), second.tax_amount.to_bits());
        assert_eq!(first.total.to_bits(), second.total.to_bits());
        assert_eq!(
            first.haul_weight_tonnes.to_bits(),
            second.haul_weight_tonnes.to_bits()
        );
        assert_eq!(first.stump_prices, second.stump_prices);
    }

    #[test]
    fn test_chip_weight_zero_without_haul_away() {
        let mut job = Job::new();
        job.add_stump();
        job.stumps[1].deep_grind = true;

        let quote = compute_quote(&job, &PricingConfig::default());
        assert_eq!(quote.haul_weight_tonnes, 0.0);
        assert_eq!(quote.chip_estimate_kg(), None);

        job.stumps[1].haul_away = true;
        let quote = compute_quote(&job, &PricingConfig::default());
        assert!(quote.haul_weight_tonnes > 0.0);
    }

    #[test]
    fn test_zero_diameter_prices_zero() {
        let quote = compute_quote(&job_with(vec![stump(0.0)]), &bare_config());
        assert_eq!(quote.subtotal, 0.0);
        assert_eq!(quote.total, 0.0);
    }

    #[test]
    fn test_empty_job_is_floored() {
        let config = PricingConfig {
            min_call_out_fee: 150.0,
            ..bare_config()
        };
        let quote = compute_quote(&job_with(Vec::new()), &config);
        assert_eq!(quote.subtotal, 150.0);
        assert!(quote.stump_prices.is_empty());
    }
}
