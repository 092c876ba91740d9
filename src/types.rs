//! Core types used throughout the calculator
//!
//! Defines deal inputs, sharing models, derived results and the saved
//! snapshot shapes handed to persistence collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ModelParseError;

/// How the agent commission is charged on the sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCommissionMode {
    /// `agent_commission_pct` of the sale price
    #[default]
    Percentage,
    /// `agent_commission_amount` charged verbatim
    FixedAmount,
}

impl fmt::Display for AgentCommissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentCommissionMode::Percentage => write!(f, "percentage"),
            AgentCommissionMode::FixedAmount => write!(f, "fixed_amount"),
        }
    }
}

/// Formula selecting the share of profit retained by Jusur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharingModel {
    #[default]
    Sliding,
    Progressive,
    Flat,
    #[serde(alias = "roi")]
    RoiTiered,
}

impl SharingModel {
    /// Every model, in comparison/chart order
    pub const ALL: [SharingModel; 4] = [
        SharingModel::Sliding,
        SharingModel::Progressive,
        SharingModel::Flat,
        SharingModel::RoiTiered,
    ];

    /// Position of this model in `ALL` and in the strategy table
    pub fn index(self) -> usize {
        match self {
            SharingModel::Sliding => 0,
            SharingModel::Progressive => 1,
            SharingModel::Flat => 2,
            SharingModel::RoiTiered => 3,
        }
    }

    /// Stable tag used in config files, CLI flags and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            SharingModel::Sliding => "sliding",
            SharingModel::Progressive => "progressive",
            SharingModel::Flat => "flat",
            SharingModel::RoiTiered => "roi_tiered",
        }
    }
}

impl FromStr for SharingModel {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sliding" => Ok(SharingModel::Sliding),
            "progressive" => Ok(SharingModel::Progressive),
            "flat" => Ok(SharingModel::Flat),
            "roi" | "roi_tiered" | "roitiered" => Ok(SharingModel::RoiTiered),
            _ => Err(ModelParseError(s.to_string())),
        }
    }
}

impl fmt::Display for SharingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything a caller supplies for one deal.
///
/// Amounts are plain decimals in a single currency; percentages are plain
/// numbers (`1.5` means 1.5%). Absent fields are zero, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DealInputs {
    #[serde(deserialize_with = "lenient::amount")]
    pub buy_price: f64,
    #[serde(deserialize_with = "lenient::amount")]
    pub sell_price: f64,
    #[serde(deserialize_with = "lenient::amount")]
    pub buy_commission_pct: f64,
    #[serde(deserialize_with = "lenient::amount")]
    pub sell_commission_pct: f64,
    pub agent_commission_mode: AgentCommissionMode,
    #[serde(deserialize_with = "lenient::amount")]
    pub agent_commission_pct: f64,
    #[serde(deserialize_with = "lenient::amount")]
    pub agent_commission_amount: f64,
    pub use_transaction_tax: bool,
    #[serde(deserialize_with = "lenient::amount")]
    pub transaction_tax_pct: f64,
    #[serde(deserialize_with = "lenient::amount")]
    pub other_expenses: f64,
    /// Only consumed by timeline reporting
    #[serde(deserialize_with = "lenient::months")]
    pub holding_period_months: u32,
    #[serde(deserialize_with = "lenient::amount")]
    pub target_roi_pct: f64,
    /// Flat model rate
    #[serde(deserialize_with = "lenient::amount")]
    pub flat_pct: f64,
    /// RoiTiered boundaries and per-tier rates
    #[serde(deserialize_with = "lenient::amount")]
    pub roi_tier1_pct: f64,
    #[serde(deserialize_with = "lenient::amount")]
    pub roi_tier2_pct: f64,
    #[serde(deserialize_with = "lenient::amount")]
    pub roi_share_pct1: f64,
    #[serde(deserialize_with = "lenient::amount")]
    pub roi_share_pct2: f64,
    #[serde(deserialize_with = "lenient::amount")]
    pub roi_share_pct3: f64,
}

impl DealInputs {
    /// Same inputs with every non-finite number replaced by zero
    pub fn sanitized(mut self) -> Self {
        for field in [
            &mut self.buy_price,
            &mut self.sell_price,
            &mut self.buy_commission_pct,
            &mut self.sell_commission_pct,
            &mut self.agent_commission_pct,
            &mut self.agent_commission_amount,
            &mut self.transaction_tax_pct,
            &mut self.other_expenses,
            &mut self.target_roi_pct,
            &mut self.flat_pct,
            &mut self.roi_tier1_pct,
            &mut self.roi_tier2_pct,
            &mut self.roi_share_pct1,
            &mut self.roi_share_pct2,
            &mut self.roi_share_pct3,
        ] {
            *field = finite_or_zero(*field);
        }
        self
    }

    /// Copy of these inputs with a different sale price
    pub fn with_sell_price(mut self, sell_price: f64) -> Self {
        self.sell_price = sell_price;
        self
    }
}

/// Output of the core derivation for one model
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DealResults {
    pub buy_commission_amount: f64,
    pub cost_to_buy: f64,
    pub sell_commission_amount: f64,
    pub agent_commission_amount: f64,
    pub transaction_tax_amount: f64,
    pub other_expenses: f64,
    pub net_sale_revenue: f64,
    pub total_profit: f64,
    /// Jusur's cut as a fraction in [0, 1]
    pub share_pct: f64,
    pub profit_cut: f64,
    pub investor_profit: f64,
    pub investor_final_return: f64,
    /// Buy commission plus profit cut
    pub managing_party_revenue: f64,
    pub partner_share_a: f64,
    pub partner_share_b: f64,
    pub investor_roi_pct: f64,
    /// Total profit over acquisition cost, before any sharing
    pub gross_roi_pct: f64,
    pub investor_profit_share_pct: f64,
}

/// One model's split at a sensitivity sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelOutcome {
    pub model: SharingModel,
    pub share_pct: f64,
    pub profit_cut: f64,
    pub investor_profit: f64,
}

/// One point of the profit sensitivity sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Fraction of the baseline profit (0.5 ..= 1.5)
    pub multiplier: f64,
    pub sell_price: f64,
    pub total_profit: f64,
    /// Indexed like `SharingModel::ALL`
    pub outcomes: [ModelOutcome; 4],
}

impl SamplePoint {
    pub fn outcome(&self, model: SharingModel) -> &ModelOutcome {
        &self.outcomes[model.index()]
    }
}

/// A saved deal: inputs, model and the results they produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealSnapshot {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub model: SharingModel,
    pub inputs: DealInputs,
    pub results: DealResults,
}

impl DealSnapshot {
    pub fn new(name: impl Into<String>, model: SharingModel, inputs: DealInputs) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            model,
            inputs,
            results: crate::engine::derive(model, &inputs),
        }
    }
}

/// A named input preset, reused across deals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealProfile {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub model: SharingModel,
    pub inputs: DealInputs,
}

impl DealProfile {
    pub fn new(name: impl Into<String>, model: SharingModel, inputs: DealInputs) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            model,
            inputs,
        }
    }
}

/// Parse a user-typed amount, treating anything unusable as zero.
///
/// Thousands separators and surrounding whitespace are ignored.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '_')
        .collect();
    cleaned.parse::<f64>().map(finite_or_zero).unwrap_or(0.0)
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Serde adapters that decode malformed numbers as zero
mod lenient {
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    struct AmountVisitor;

    impl<'de> Visitor<'de> for AmountVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or numeric string")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(super::finite_or_zero(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            Ok(super::parse_amount(v))
        }

        fn visit_bool<E: de::Error>(self, _v: bool) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_none<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<f64, D::Error> {
            d.deserialize_any(AmountVisitor)
        }
    }

    pub fn amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        d.deserialize_any(AmountVisitor)
    }

    pub fn months<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let v = amount(d)?;
        Ok(if v > 0.0 {
            v.trunc().min(u32::MAX as f64) as u32
        } else {
            0
        })
    }
}
