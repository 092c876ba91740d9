//! Jusur Deal Calculator Library
//!
//! Profit-sharing engine for investor / Jusur buy-sell deals, plus the
//! configuration, persistence and report plumbing around it.

pub mod config;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod report;
pub mod types;

pub use engine::{break_even_price, derive, derive_all, sensitivity, try_break_even_price};
pub use types::{
    AgentCommissionMode, DealInputs, DealProfile, DealResults, DealSnapshot, ModelOutcome,
    SamplePoint, SharingModel,
};
