use tracing::trace;

use super::models::share_pct;
use crate::types::{AgentCommissionMode, DealInputs, DealResults, SharingModel};

/// Purchase price plus buy-side commission
pub fn acquisition_cost(inputs: &DealInputs) -> f64 {
    inputs.buy_price + inputs.buy_price * inputs.buy_commission_pct / 100.0
}

/// Sale-side deductions that scale with the sale price, as a fraction
pub(crate) fn proportional_sell_rate(inputs: &DealInputs) -> f64 {
    let agent = match inputs.agent_commission_mode {
        AgentCommissionMode::Percentage => inputs.agent_commission_pct,
        AgentCommissionMode::FixedAmount => 0.0,
    };
    let tax = if inputs.use_transaction_tax {
        inputs.transaction_tax_pct
    } else {
        0.0
    };
    (inputs.sell_commission_pct + agent + tax) / 100.0
}

/// Sale-side deductions that do not depend on the sale price
pub(crate) fn fixed_sell_deductions(inputs: &DealInputs) -> f64 {
    let agent = match inputs.agent_commission_mode {
        AgentCommissionMode::Percentage => 0.0,
        AgentCommissionMode::FixedAmount => inputs.agent_commission_amount,
    };
    agent + inputs.other_expenses
}

fn ratio_pct(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

/// Run the full derivation for one sharing model.
///
/// Total over its domain: a non-positive profit yields a zero cut and every
/// ratio with a non-positive denominator is reported as zero.
pub fn derive(model: SharingModel, inputs: &DealInputs) -> DealResults {
    let buy_commission_amount = inputs.buy_price * inputs.buy_commission_pct / 100.0;
    let cost_to_buy = inputs.buy_price + buy_commission_amount;

    let sell_commission_amount = inputs.sell_price * inputs.sell_commission_pct / 100.0;
    let agent_commission_amount = match inputs.agent_commission_mode {
        AgentCommissionMode::Percentage => inputs.sell_price * inputs.agent_commission_pct / 100.0,
        AgentCommissionMode::FixedAmount => inputs.agent_commission_amount,
    };
    let transaction_tax_amount = if inputs.use_transaction_tax {
        inputs.sell_price * inputs.transaction_tax_pct / 100.0
    } else {
        0.0
    };

    let net_sale_revenue = inputs.sell_price
        - sell_commission_amount
        - agent_commission_amount
        - transaction_tax_amount
        - inputs.other_expenses;
    let total_profit = net_sale_revenue - cost_to_buy;

    let share = share_pct(model, total_profit, inputs);
    let profit_cut = (total_profit * share).max(0.0);
    let investor_profit = (total_profit - profit_cut).max(0.0);
    let investor_final_return = cost_to_buy + investor_profit;

    let managing_party_revenue = buy_commission_amount + profit_cut;
    let half = managing_party_revenue / 2.0;

    let results = DealResults {
        buy_commission_amount,
        cost_to_buy,
        sell_commission_amount,
        agent_commission_amount,
        transaction_tax_amount,
        other_expenses: inputs.other_expenses,
        net_sale_revenue,
        total_profit,
        share_pct: share,
        profit_cut,
        investor_profit,
        investor_final_return,
        managing_party_revenue,
        partner_share_a: half,
        partner_share_b: half,
        investor_roi_pct: ratio_pct(investor_profit, cost_to_buy),
        gross_roi_pct: ratio_pct(total_profit, cost_to_buy),
        investor_profit_share_pct: ratio_pct(investor_profit, total_profit),
    };

    trace!(
        model = %model,
        total_profit,
        share_pct = share,
        profit_cut,
        "deal derived"
    );

    results
}

/// Derive the same deal under every sharing model, in `SharingModel::ALL` order
pub fn derive_all(inputs: &DealInputs) -> [(SharingModel, DealResults); 4] {
    SharingModel::ALL.map(|model| (model, derive(model, inputs)))
}
