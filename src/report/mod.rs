//! Deal reports
//!
//! Turns inputs, results and sensitivity sweeps into delimited text for
//! export, and interpolates the holding-period timeline.
//! Money and percentages are rounded to two decimals, half away from zero;
//! non-finite numbers are written as `n/a`.

use std::io::Write;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::info;

use crate::engine::SensitivityPlan;
use crate::error::ReportError;
use crate::types::{AgentCommissionMode, DealInputs, DealResults, SharingModel};

/// Placeholder for values that cannot be shown
pub const NOT_AVAILABLE: &str = "n/a";

/// Single `section,field,value` line of a deal report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub section: &'static str,
    pub field: &'static str,
    pub value: String,
}

impl ReportRow {
    fn new(section: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self {
            section,
            field,
            value: value.into(),
        }
    }
}

/// Flat record per sensitivity sample point
#[derive(Debug, Clone, Serialize)]
struct SensitivityRow {
    profit_level_pct: String,
    sell_price: String,
    total_profit: String,
    sliding_cut: String,
    sliding_investor: String,
    progressive_cut: String,
    progressive_investor: String,
    flat_cut: String,
    flat_investor: String,
    roi_tiered_cut: String,
    roi_tiered_investor: String,
}

/// Investor position at one month of the holding period
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub month: u32,
    pub value: f64,
}

/// Round to two decimals, half away from zero
pub fn round_money(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Display form of `round_money`, always with two decimals
pub fn format_money(value: f64) -> String {
    match round_money(value) {
        Some(d) => format!("{:.2}", d),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `value` is already in percent; rounded like `format_money`
pub fn format_pct(value: f64) -> String {
    match round_money(value) {
        Some(d) => format!("{:.2}%", d),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Rows describing one deal, inputs first then results
pub fn deal_rows(
    name: &str,
    model: SharingModel,
    inputs: &DealInputs,
    results: &DealResults,
) -> Vec<ReportRow> {
    let mut rows = vec![
        ReportRow::new("deal", "name", name),
        ReportRow::new("deal", "model", model.as_str()),
        ReportRow::new("inputs", "buy_price", format_money(inputs.buy_price)),
        ReportRow::new("inputs", "buy_commission_pct", format_pct(inputs.buy_commission_pct)),
        ReportRow::new("inputs", "sell_price", format_money(inputs.sell_price)),
        ReportRow::new("inputs", "sell_commission_pct", format_pct(inputs.sell_commission_pct)),
        ReportRow::new(
            "inputs",
            "agent_commission_mode",
            inputs.agent_commission_mode.to_string(),
        ),
    ];

    rows.push(match inputs.agent_commission_mode {
        AgentCommissionMode::Percentage => ReportRow::new(
            "inputs",
            "agent_commission_pct",
            format_pct(inputs.agent_commission_pct),
        ),
        AgentCommissionMode::FixedAmount => ReportRow::new(
            "inputs",
            "agent_commission_amount",
            format_money(inputs.agent_commission_amount),
        ),
    });

    if inputs.use_transaction_tax {
        rows.push(ReportRow::new(
            "inputs",
            "transaction_tax_pct",
            format_pct(inputs.transaction_tax_pct),
        ));
    }

    rows.extend([
        ReportRow::new("inputs", "other_expenses", format_money(inputs.other_expenses)),
        ReportRow::new(
            "inputs",
            "holding_period_months",
            inputs.holding_period_months.to_string(),
        ),
    ]);

    match model {
        SharingModel::Flat => {
            rows.push(ReportRow::new("inputs", "flat_pct", format_pct(inputs.flat_pct)))
        }
        SharingModel::RoiTiered => rows.extend([
            ReportRow::new("inputs", "roi_tier1_pct", format_pct(inputs.roi_tier1_pct)),
            ReportRow::new("inputs", "roi_tier2_pct", format_pct(inputs.roi_tier2_pct)),
            ReportRow::new("inputs", "roi_share_pct1", format_pct(inputs.roi_share_pct1)),
            ReportRow::new("inputs", "roi_share_pct2", format_pct(inputs.roi_share_pct2)),
            ReportRow::new("inputs", "roi_share_pct3", format_pct(inputs.roi_share_pct3)),
        ]),
        SharingModel::Sliding | SharingModel::Progressive => {}
    }

    let r = results;
    rows.extend([
        ReportRow::new("results", "buy_commission", format_money(r.buy_commission_amount)),
        ReportRow::new("results", "cost_to_buy", format_money(r.cost_to_buy)),
        ReportRow::new("results", "sell_commission", format_money(r.sell_commission_amount)),
        ReportRow::new("results", "agent_commission", format_money(r.agent_commission_amount)),
        ReportRow::new("results", "transaction_tax", format_money(r.transaction_tax_amount)),
        ReportRow::new("results", "other_expenses", format_money(r.other_expenses)),
        ReportRow::new("results", "net_sale_revenue", format_money(r.net_sale_revenue)),
        ReportRow::new("results", "total_profit", format_money(r.total_profit)),
        ReportRow::new("results", "jusur_share_pct", format_pct(r.share_pct * 100.0)),
        ReportRow::new("results", "jusur_profit_cut", format_money(r.profit_cut)),
        ReportRow::new("results", "investor_profit", format_money(r.investor_profit)),
        ReportRow::new(
            "results",
            "investor_final_return",
            format_money(r.investor_final_return),
        ),
        ReportRow::new(
            "results",
            "jusur_total_revenue",
            format_money(r.managing_party_revenue),
        ),
        ReportRow::new("results", "partner_share_a", format_money(r.partner_share_a)),
        ReportRow::new("results", "partner_share_b", format_money(r.partner_share_b)),
        ReportRow::new("results", "investor_roi", format_pct(r.investor_roi_pct)),
        ReportRow::new(
            "results",
            "investor_profit_share",
            format_pct(r.investor_profit_share_pct),
        ),
    ]);

    rows
}

/// Write a deal report as CSV with a `section,field,value` header
pub fn write_deal_csv<W: Write>(
    writer: W,
    name: &str,
    model: SharingModel,
    inputs: &DealInputs,
    results: &DealResults,
) -> Result<(), ReportError> {
    let rows = deal_rows(name, model, inputs, results);
    let mut csv = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in &rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    info!(deal = name, rows = rows.len(), "deal report written");
    Ok(())
}

/// Write every point of a sensitivity sweep as CSV. Returns the row count.
pub fn write_sensitivity_csv<W: Write>(
    writer: W,
    plan: &SensitivityPlan,
) -> Result<usize, ReportError> {
    let mut csv = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    let mut count = 0;
    for point in plan {
        let cut = |m: SharingModel| format_money(point.outcome(m).profit_cut);
        let investor = |m: SharingModel| format_money(point.outcome(m).investor_profit);
        csv.serialize(SensitivityRow {
            profit_level_pct: format!("{:.0}", point.multiplier * 100.0),
            sell_price: format_money(point.sell_price),
            total_profit: format_money(point.total_profit),
            sliding_cut: cut(SharingModel::Sliding),
            sliding_investor: investor(SharingModel::Sliding),
            progressive_cut: cut(SharingModel::Progressive),
            progressive_investor: investor(SharingModel::Progressive),
            flat_cut: cut(SharingModel::Flat),
            flat_investor: investor(SharingModel::Flat),
            roi_tiered_cut: cut(SharingModel::RoiTiered),
            roi_tiered_investor: investor(SharingModel::RoiTiered),
        })?;
        count += 1;
    }
    csv.flush()?;
    Ok(count)
}

/// Month-by-month investor position, straight-line from the acquisition
/// cost to the final return over `holding_period_months`.
pub fn timeline(inputs: &DealInputs, results: &DealResults) -> Vec<TimelinePoint> {
    let months = inputs.holding_period_months;
    if months == 0 {
        return Vec::new();
    }

    let start = results.cost_to_buy;
    let gain = results.investor_final_return - results.cost_to_buy;
    (0..=months)
        .map(|month| TimelinePoint {
            month,
            value: start + gain * month as f64 / months as f64,
        })
        .collect()
}
