//! Deal calculation engine.
//!
//! Pure functions over `DealInputs`: the core derivation, the four
//! profit-sharing strategies, the break-even solver and the sensitivity
//! sweep. Nothing here performs I/O or keeps state between calls.

pub mod break_even;
pub mod derivation;
pub mod models;
pub mod sensitivity;

pub use break_even::{break_even_price, price_for_profit, try_break_even_price};
pub use derivation::{acquisition_cost, derive, derive_all};
pub use models::{
    share_pct, FLAT_CAP, PROGRESSIVE_TIERS, SLIDING_CEILING, SLIDING_FLOOR, SLIDING_SCALE,
};
pub use sensitivity::{sensitivity, SensitivityPlan, SensitivitySweep, SweepGap, SAMPLE_COUNT};
