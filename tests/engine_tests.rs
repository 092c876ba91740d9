//! End-to-end tests for the deal calculator

#[cfg(test)]
mod tests {
    use jusur_calc::engine::{
        break_even_price, derive, derive_all, price_for_profit, sensitivity, SAMPLE_COUNT,
    };
    use jusur_calc::persistence::{MemoryStore, RecordStore};
    use jusur_calc::report::write_deal_csv;
    use jusur_calc::types::{AgentCommissionMode, DealInputs, DealSnapshot, SharingModel};

    fn villa() -> DealInputs {
        DealInputs {
            buy_price: 5_600_000.0,
            buy_commission_pct: 1.0,
            sell_price: 7_200_000.0,
            sell_commission_pct: 1.5,
            target_roi_pct: 12.0,
            flat_pct: 35.0,
            roi_tier1_pct: 10.0,
            roi_tier2_pct: 20.0,
            roi_share_pct1: 20.0,
            roi_share_pct2: 30.0,
            roi_share_pct3: 40.0,
            ..Default::default()
        }
    }

    fn loaded_villa() -> DealInputs {
        DealInputs {
            agent_commission_mode: AgentCommissionMode::FixedAmount,
            agent_commission_amount: 40_000.0,
            use_transaction_tax: true,
            transaction_tax_pct: 2.5,
            other_expenses: 18_500.0,
            ..villa()
        }
    }

    // ============================================================================
    // Core derivation
    // ============================================================================

    #[test]
    fn reference_example_matches_hand_calculation() {
        let r = derive(SharingModel::Sliding, &villa());
        assert!((r.total_profit - 1_436_000.0).abs() < 1e-6);
        assert!((r.share_pct - 0.3795).abs() < 1e-9);
        assert!((r.profit_cut - 544_962.0).abs() < 1e-3);
        assert!((r.investor_profit - 891_038.0).abs() < 1e-3);
        assert!((r.investor_roi_pct - 15.75).abs() < 0.01);
    }

    #[test]
    fn shares_always_add_up_to_profit() {
        for inputs in [villa(), loaded_villa()] {
            for (model, r) in derive_all(&inputs) {
                assert!(r.total_profit > 0.0, "{model} should be profitable");
                assert!((r.profit_cut + r.investor_profit - r.total_profit).abs() < 1e-6);
                assert!((r.investor_profit_share_pct + r.share_pct * 100.0 - 100.0).abs() < 1e-9);
                assert!(
                    (r.investor_final_return - r.cost_to_buy - r.investor_profit).abs() < 1e-6
                );
            }
        }
    }

    #[test]
    fn models_differ_on_the_same_deal() {
        let all = derive_all(&villa());
        let cut = |m: SharingModel| all[m.index()].1.profit_cut;

        assert!((cut(SharingModel::Flat) - 1_436_000.0 * 0.35).abs() < 1e-6);
        // 125k + 175k + 436k * 0.45
        assert!((cut(SharingModel::Progressive) - 496_200.0).abs() < 1e-6);
        // ROI 25.4% lands in the top tier
        assert!((cut(SharingModel::RoiTiered) - 1_436_000.0 * 0.40).abs() < 1e-6);
        assert_eq!(all[0].0, SharingModel::Sliding);
    }

    #[test]
    fn unprofitable_deals_attribute_the_loss_to_the_investor() {
        let inputs = villa().with_sell_price(5_500_000.0);
        for (_, r) in derive_all(&inputs) {
            assert!(r.total_profit < 0.0);
            assert_eq!(r.profit_cut, 0.0);
            assert_eq!(r.investor_profit, 0.0);
            assert_eq!(r.investor_final_return, r.cost_to_buy);
            assert!(r.investor_roi_pct <= 0.0);
        }
    }

    #[test]
    fn roi_tier_boundary_selects_lower_tier() {
        let inputs = DealInputs {
            buy_price: 1_000_000.0,
            sell_price: 1_100_000.0,
            roi_tier1_pct: 10.0,
            roi_tier2_pct: 20.0,
            roi_share_pct1: 20.0,
            roi_share_pct2: 30.0,
            roi_share_pct3: 40.0,
            ..Default::default()
        };

        let r = derive(SharingModel::RoiTiered, &inputs);
        assert_eq!(r.gross_roi_pct, 10.0);
        assert_eq!(r.share_pct, 0.2);
    }

    // ============================================================================
    // Break-even
    // ============================================================================

    #[test]
    fn break_even_round_trips_for_every_model() {
        for inputs in [villa(), loaded_villa()] {
            let price = break_even_price(&inputs);
            assert!(price.is_finite() && price > 0.0);

            let at_break_even = inputs.with_sell_price(price);
            for (model, r) in derive_all(&at_break_even) {
                assert!(
                    (r.gross_roi_pct - inputs.target_roi_pct).abs() < 1e-9,
                    "{model}: gross ROI {} != target {}",
                    r.gross_roi_pct,
                    inputs.target_roi_pct
                );
                assert!(r.investor_roi_pct <= inputs.target_roi_pct + 1e-9);
            }
        }
    }

    #[test]
    fn break_even_ignores_the_sharing_model_inputs() {
        let mut other = villa();
        other.flat_pct = 80.0;
        other.roi_share_pct3 = 5.0;
        assert_eq!(break_even_price(&villa()), break_even_price(&other));
    }

    #[test]
    fn break_even_without_a_solution_is_not_finite() {
        let inputs = DealInputs {
            agent_commission_mode: AgentCommissionMode::Percentage,
            agent_commission_pct: 98.5,
            ..villa()
        };
        assert!(!break_even_price(&inputs).is_finite());
    }

    // ============================================================================
    // Sensitivity
    // ============================================================================

    #[test]
    fn sensitivity_covers_all_models_at_each_level() {
        let inputs = loaded_villa();
        let base = derive(SharingModel::RoiTiered, &inputs);
        let plan = sensitivity(&inputs, &base);
        assert_eq!(plan.len(), SAMPLE_COUNT);

        let points: Vec<_> = plan.iter().collect();
        for (i, point) in points.iter().enumerate() {
            assert!((point.multiplier - (0.5 + 0.1 * i as f64)).abs() < 1e-12);
            assert!(
                (point.sell_price - price_for_profit(&inputs, base.total_profit * point.multiplier))
                    .abs()
                    < 1e-9
            );
            for model in SharingModel::ALL {
                let direct = derive(model, &inputs.with_sell_price(point.sell_price));
                assert_eq!(point.outcome(model).profit_cut, direct.profit_cut);
                assert_eq!(point.outcome(model).investor_profit, direct.investor_profit);
            }
        }

        // Higher profit never lowers Jusur's cut. The investor's profit can dip
        // where RoiTiered jumps to a steeper tier, so it is only checked for
        // the continuous models.
        for pair in points.windows(2) {
            for model in SharingModel::ALL {
                assert!(pair[1].outcome(model).profit_cut >= pair[0].outcome(model).profit_cut);
            }
            for model in [SharingModel::Sliding, SharingModel::Progressive, SharingModel::Flat] {
                assert!(
                    pair[1].outcome(model).investor_profit
                        >= pair[0].outcome(model).investor_profit
                );
            }
        }
    }

    #[test]
    fn sensitivity_is_empty_without_profit() {
        let inputs = villa().with_sell_price(5_000_000.0);
        let base = derive(SharingModel::Sliding, &inputs);
        assert_eq!(sensitivity(&inputs, &base).iter().count(), 0);
    }

    // ============================================================================
    // Collaborators
    // ============================================================================

    #[test]
    fn saved_deal_reproduces_its_results_and_report() {
        let store = MemoryStore::<DealSnapshot>::new();
        let snapshot = DealSnapshot::new("villa", SharingModel::Progressive, villa());
        let id = snapshot.id;
        store.save(snapshot).unwrap();

        let loaded = store.load(id).unwrap().unwrap();
        assert_eq!(loaded.results, derive(loaded.model, &loaded.inputs));

        let mut buf = Vec::new();
        write_deal_csv(&mut buf, &loaded.name, loaded.model, &loaded.inputs, &loaded.results)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("deal,model,progressive"));
        assert!(text.contains("results,jusur_profit_cut,496200.00"));
    }
}
