//! Profit-sharing strategies
//!
//! Each strategy maps a positive total profit (plus the deal inputs it
//! needs) to the fraction of that profit retained by Jusur. Dispatch goes
//! through a fixed table indexed by `SharingModel::index`.

use super::derivation::acquisition_cost;
use crate::types::{DealInputs, SharingModel};

/// Sliding model: share at zero profit
pub const SLIDING_FLOOR: f64 = 0.20;
/// Sliding model: share once the ramp is exhausted
pub const SLIDING_CEILING: f64 = 0.45;
/// Sliding model: profit at which the ramp reaches the ceiling
pub const SLIDING_SCALE: f64 = 2_000_000.0;

/// Progressive model: (upper profit bound, marginal rate) per tier
pub const PROGRESSIVE_TIERS: [(f64, f64); 3] = [
    (500_000.0, 0.25),
    (1_000_000.0, 0.35),
    (f64::INFINITY, 0.45),
];

/// Flat model: highest rate a configured percentage can produce
pub const FLAT_CAP: f64 = 0.9;

type ShareStrategy = fn(f64, &DealInputs) -> f64;

const STRATEGY_TABLE: [ShareStrategy; 4] = [sliding, progressive, flat, roi_tiered];

/// Fraction of `total_profit` retained by Jusur under `model`.
///
/// Zero whenever there is no positive profit to share.
pub fn share_pct(model: SharingModel, total_profit: f64, inputs: &DealInputs) -> f64 {
    if !(total_profit > 0.0) {
        return 0.0;
    }
    STRATEGY_TABLE[model.index()](total_profit, inputs)
}

fn sliding(total_profit: f64, _inputs: &DealInputs) -> f64 {
    let ramp = (total_profit / SLIDING_SCALE) * (SLIDING_CEILING - SLIDING_FLOOR);
    (SLIDING_FLOOR + ramp).clamp(SLIDING_FLOOR, SLIDING_CEILING)
}

fn progressive(total_profit: f64, _inputs: &DealInputs) -> f64 {
    let mut cut = 0.0;
    let mut lower = 0.0;
    for (upper, rate) in PROGRESSIVE_TIERS {
        if total_profit <= lower {
            break;
        }
        cut += (total_profit.min(upper) - lower) * rate;
        lower = upper;
    }
    cut / total_profit
}

fn flat(_total_profit: f64, inputs: &DealInputs) -> f64 {
    (inputs.flat_pct / 100.0).clamp(0.0, FLAT_CAP)
}

// Tier order is not validated: an inverted schedule is applied as given.
fn roi_tiered(total_profit: f64, inputs: &DealInputs) -> f64 {
    let cost = acquisition_cost(inputs);
    let roi = if cost > 0.0 {
        total_profit / cost * 100.0
    } else {
        0.0
    };

    let tier_pct = if roi <= inputs.roi_tier1_pct {
        inputs.roi_share_pct1
    } else if roi <= inputs.roi_tier2_pct {
        inputs.roi_share_pct2
    } else {
        inputs.roi_share_pct3
    };
    tier_pct / 100.0
}
