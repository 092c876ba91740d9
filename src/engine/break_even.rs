use tracing::debug;

use super::derivation::{acquisition_cost, fixed_sell_deductions, proportional_sell_rate};
use crate::types::DealInputs;

/// Sale price whose net revenue leaves exactly `target_profit` over the
/// acquisition cost.
///
/// Solves `price * (1 - rates) - fixed = cost + target_profit`. Returns NaN
/// when the proportional rates consume the whole sale price, since no price
/// can then cover the cost.
pub fn price_for_profit(inputs: &DealInputs, target_profit: f64) -> f64 {
    let denominator = 1.0 - proportional_sell_rate(inputs);
    if !(denominator > 0.0) {
        debug!(
            rates = proportional_sell_rate(inputs),
            "sale-side rates leave no revenue, price undefined"
        );
        return f64::NAN;
    }

    let required_net_revenue = acquisition_cost(inputs) + target_profit;
    ((required_net_revenue + fixed_sell_deductions(inputs)) / denominator).max(0.0)
}

/// Minimum sale price reaching `target_roi_pct` on the acquisition cost.
///
/// Independent of the sharing model. NaN means no such price exists.
pub fn break_even_price(inputs: &DealInputs) -> f64 {
    let target_profit = acquisition_cost(inputs) * (inputs.target_roi_pct / 100.0);
    price_for_profit(inputs, target_profit)
}

/// `break_even_price`, with the unreachable case as `None`
pub fn try_break_even_price(inputs: &DealInputs) -> Option<f64> {
    Some(break_even_price(inputs)).filter(|price| price.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::derive;
    use crate::types::{AgentCommissionMode, SharingModel};

    fn deal() -> DealInputs {
        DealInputs {
            buy_price: 5_600_000.0,
            buy_commission_pct: 1.0,
            sell_price: 7_200_000.0,
            sell_commission_pct: 1.5,
            target_roi_pct: 15.0,
            ..Default::default()
        }
    }

    #[test]
    fn solves_for_target_roi() {
        // (5,656,000 * 1.15) / 0.985
        let price = break_even_price(&deal());
        assert!((price - 6_504_400.0 / 0.985).abs() < 1e-6);
    }

    #[test]
    fn zero_target_recovers_cost_only() {
        let inputs = DealInputs {
            target_roi_pct: 0.0,
            ..deal()
        };
        let price = break_even_price(&inputs);
        let r = derive(SharingModel::Sliding, &inputs.with_sell_price(price));
        assert!(r.total_profit.abs() < 1e-6);
    }

    #[test]
    fn fixed_deductions_are_added_back() {
        let inputs = DealInputs {
            agent_commission_mode: AgentCommissionMode::FixedAmount,
            agent_commission_amount: 20_000.0,
            agent_commission_pct: 50.0,
            other_expenses: 5_000.0,
            ..deal()
        };
        let price = break_even_price(&inputs);
        assert!((price - (6_504_400.0 + 25_000.0) / 0.985).abs() < 1e-6);
    }

    #[test]
    fn rates_at_or_above_full_price_have_no_solution() {
        let inputs = DealInputs {
            sell_commission_pct: 60.0,
            agent_commission_pct: 30.0,
            use_transaction_tax: true,
            transaction_tax_pct: 10.0,
            ..deal()
        };
        assert!(break_even_price(&inputs).is_nan());
        assert_eq!(try_break_even_price(&inputs), None);
    }

    #[test]
    fn deeply_negative_target_clamps_to_zero() {
        let inputs = DealInputs {
            target_roi_pct: -200.0,
            ..deal()
        };
        assert_eq!(try_break_even_price(&inputs), Some(0.0));
    }
}
