use chrono::{TimeZone, Utc};
use pozole::prelude::*;
use proptest::prelude::*;

fn walk(start: f64, steps: &[f64]) -> Vec<PriceBar> {
    let mut price = start;
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| {
            price = (price + step).max(1.0);
            let ts = Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap();
            PriceBar::new_unchecked(ts, price)
        })
        .collect()
}

fn any_smoothing() -> impl Strategy<Value = Smoothing> {
    prop_oneof![Just(Smoothing::Adjusted), Just(Smoothing::Recursive)]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn simulation_invariants_hold(
        steps in prop::collection::vec(-5.0f64..5.0, 0..300),
        fast in 1usize..60,
        slow in 1usize..120,
        stop_loss in 0.25f64..25.0,
        take_profit in 0.25f64..25.0,
        smoothing in any_smoothing(),
    ) {
        let bars = walk(4000.0, &steps);
        let params = StrategyParams::new(fast, slow, stop_loss, take_profit).with_smoothing(smoothing);
        let result = simulate(&bars, &params);

        //equity starts at zero and accumulates each trade
        prop_assert_eq!(result.equity_curve.len(), result.trades.len() + 1);
        prop_assert_eq!(result.equity_curve[0], 0.0);
        for (k, trade) in result.trades.iter().enumerate() {
            prop_assert_eq!(result.equity_curve[k + 1], result.equity_curve[k] + trade.profit);
        }

        //no trade closes inside the bracket
        for trade in &result.trades {
            prop_assert!(trade.profit >= take_profit || trade.profit <= -stop_loss);
            prop_assert!(trade.entry_index >= 1);
            prop_assert!(trade.exit_index > trade.entry_index);
        }

        //trades never overlap, so there is no direct long/short flip
        for pair in result.trades.windows(2) {
            prop_assert!(pair[1].entry_index > pair[0].exit_index);
        }

        //net pnl is the last equity value
        let net: f64 = result.trades.iter().map(|t| t.profit).sum();
        prop_assert!((result.net_pnl() - net).abs() < 1e-6);
        let summary = SummaryMetrics::from_result(&result, None);
        prop_assert_eq!(summary.net_pnl, result.net_pnl());
        prop_assert!((0.0..=1.0).contains(&summary.win_rate));
    }

    #[test]
    fn too_short_series_is_inert(
        steps in prop::collection::vec(-5.0f64..5.0, 0..2),
        fast in 1usize..60,
        slow in 1usize..120,
    ) {
        let result = simulate(&walk(100.0, &steps), &StrategyParams::new(fast, slow, 1.0, 1.0));
        prop_assert!(result.trades.is_empty());
        prop_assert_eq!(result.equity_curve, vec![0.0]);
    }

    #[test]
    fn equal_spans_never_trade(
        steps in prop::collection::vec(-5.0f64..5.0, 0..200),
        span in 1usize..100,
        smoothing in any_smoothing(),
    ) {
        let params = StrategyParams::new(span, span, 1.0, 1.0).with_smoothing(smoothing);
        let result = simulate(&walk(100.0, &steps), &params);
        prop_assert!(result.trades.is_empty());
    }

    #[test]
    fn ema_stays_within_input_range(
        values in prop::collection::vec(1.0f64..10_000.0, 1..200),
        span in 1usize..100,
        smoothing in any_smoothing(),
    ) {
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let smoothed = ema(&values, span, smoothing);
        prop_assert_eq!(smoothed.len(), values.len());
        prop_assert_eq!(smoothed[0], values[0]);
        for v in smoothed {
            prop_assert!(v >= lo - 1e-6 && v <= hi + 1e-6);
        }
    }
}
