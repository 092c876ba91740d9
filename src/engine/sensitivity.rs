//! Profit sensitivity sweep
//!
//! Re-prices a deal at 50%..=150% of its baseline profit (10% steps) and
//! splits each hypothetical profit under every sharing model. The plan is
//! `Copy`; each call to `iter` starts a fresh, independent sweep.

use std::fmt;
use std::iter::FusedIterator;

use tracing::debug;

use super::break_even::price_for_profit;
use super::derivation::derive;
use crate::types::{DealInputs, DealResults, ModelOutcome, SamplePoint, SharingModel};

/// Points in a non-empty sweep
pub const SAMPLE_COUNT: usize = 11;

const FIRST_MULTIPLIER_PCT: u32 = 50;
const MULTIPLIER_STEP_PCT: u32 = 10;

/// Why a plan has no points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepGap {
    /// Sale-side rates reach 100%, no sale price yields a given profit
    Unsolvable,
    /// Baseline profit is zero or negative
    NoProfit,
}

impl fmt::Display for SweepGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepGap::Unsolvable => write!(f, "sale-side rates sum to 100% or more"),
            SweepGap::NoProfit => write!(f, "the deal has no positive profit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensitivityPlan {
    inputs: DealInputs,
    base_profit: f64,
    gap: Option<SweepGap>,
}

/// Plan a sweep around `base`, the results previously derived for `inputs`.
///
/// Empty when no sale price can be solved for or when the baseline has no
/// positive profit; `gap` tells which.
pub fn sensitivity(inputs: &DealInputs, base: &DealResults) -> SensitivityPlan {
    let gap = if !price_for_profit(inputs, base.total_profit).is_finite() {
        Some(SweepGap::Unsolvable)
    } else if base.total_profit > 0.0 {
        None
    } else {
        Some(SweepGap::NoProfit)
    };
    if let Some(gap) = gap {
        debug!(total_profit = base.total_profit, %gap, "no sensitivity sweep around this baseline");
    }

    SensitivityPlan {
        inputs: *inputs,
        base_profit: base.total_profit,
        gap,
    }
}

impl SensitivityPlan {
    pub fn iter(&self) -> SensitivitySweep {
        SensitivitySweep {
            plan: *self,
            next: 0,
        }
    }

    pub fn len(&self) -> usize {
        if self.gap.is_some() {
            0
        } else {
            SAMPLE_COUNT
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gap.is_some()
    }

    pub fn gap(&self) -> Option<SweepGap> {
        self.gap
    }

    pub fn base_profit(&self) -> f64 {
        self.base_profit
    }

    fn sample(&self, index: usize) -> SamplePoint {
        let multiplier_pct = FIRST_MULTIPLIER_PCT + MULTIPLIER_STEP_PCT * index as u32;
        let multiplier = multiplier_pct as f64 / 100.0;

        let sell_price = price_for_profit(&self.inputs, self.base_profit * multiplier);
        let scenario = self.inputs.with_sell_price(sell_price);
        let results = SharingModel::ALL.map(|model| derive(model, &scenario));

        SamplePoint {
            multiplier,
            sell_price,
            total_profit: results[0].total_profit,
            outcomes: std::array::from_fn(|i| ModelOutcome {
                model: SharingModel::ALL[i],
                share_pct: results[i].share_pct,
                profit_cut: results[i].profit_cut,
                investor_profit: results[i].investor_profit,
            }),
        }
    }
}

impl<'a> IntoIterator for &'a SensitivityPlan {
    type Item = SamplePoint;
    type IntoIter = SensitivitySweep;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for SensitivityPlan {
    type Item = SamplePoint;
    type IntoIter = SensitivitySweep;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One pass over a `SensitivityPlan`
#[derive(Debug, Clone)]
pub struct SensitivitySweep {
    plan: SensitivityPlan,
    next: usize,
}

impl Iterator for SensitivitySweep {
    type Item = SamplePoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.plan.len() {
            return None;
        }
        let point = self.plan.sample(self.next);
        self.next += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.plan.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SensitivitySweep {}

impl FusedIterator for SensitivitySweep {}
