use chrono::{TimeZone, Utc};
use pozole::prelude::*;

fn bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let ts = Utc.timestamp_opt(1_709_303_400 + i as i64 * 300, 0).unwrap();
            PriceBar::new(ts, close).unwrap()
        })
        .collect()
}

fn assert_equity_consistent(result: &SimulationResult) {
    assert_eq!(result.equity_curve.len(), result.trades.len() + 1);
    assert_eq!(result.equity_curve[0], 0.0);
    for (k, trade) in result.trades.iter().enumerate() {
        assert_eq!(result.equity_curve[k + 1], result.equity_curve[k] + trade.profit);
    }
}

#[test]
fn flat_price_never_trades() {
    let series = bars(&[4500.0; 20]);
    for (fast, slow) in [(5, 20), (20, 5), (1, 200)] {
        for smoothing in [Smoothing::Adjusted, Smoothing::Recursive] {
            let params = StrategyParams::new(fast, slow, 10.0, 20.0).with_smoothing(smoothing);
            let result = simulate(&series, &params);
            assert!(result.trades.is_empty());
            assert_eq!(result.equity_curve, vec![0.0]);
            assert_eq!(result.series.fast, result.series.slow);
        }
    }
}

#[test]
fn rising_series_hits_take_profit() {
    let closes: Vec<f64> = (0..=30).map(|i| 100.0 + i as f64).collect();
    let result = simulate(&bars(&closes), &StrategyParams::new(5, 20, 10.0, 5.0));

    assert!(!result.trades.is_empty());
    for trade in &result.trades {
        assert_eq!(trade.side, Side::Long);
        assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
        assert!((trade.profit - 5.0).abs() < 1e-9);
    }

    //entries at 101, 107, 113, 119, 125, each exiting five bars later
    let entries: Vec<f64> = result.trades.iter().map(|t| t.entry_price).collect();
    assert_eq!(entries, vec![101.0, 107.0, 113.0, 119.0, 125.0]);
    assert!((result.net_pnl() - 25.0).abs() < 1e-9);
    assert_equity_consistent(&result);
}

#[test]
fn short_is_stopped_out_on_adverse_jump() {
    //falling into bar 1 opens a short at 100, then price jumps 15 points
    let result = simulate(&bars(&[101.0, 100.0, 115.0]), &StrategyParams::new(5, 20, 10.0, 20.0));

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.side, Side::Short);
    assert_eq!(trade.entry_price, 100.0);
    assert_eq!(trade.exit_reason, ExitReason::StopLoss);
    assert!(trade.profit <= -10.0);
    assert_eq!(result.equity_curve, vec![0.0, -15.0]);
}

#[test]
fn stop_uses_first_breaching_close() {
    let result = simulate(
        &bars(&[101.0, 100.0, 104.0, 108.0, 112.0, 115.0]),
        &StrategyParams::new(5, 20, 10.0, 20.0),
    );

    let trade = &result.trades[0];
    assert_eq!(trade.side, Side::Short);
    assert_eq!(trade.exit_index, 4);
    assert_eq!(trade.profit, -12.0);
}

#[test]
fn equal_spans_never_open() {
    let closes: Vec<f64> = (0..50).map(|i| 100.0 + ((i * 7) % 11) as f64).collect();
    let result = simulate(&bars(&closes), &StrategyParams::new(14, 14, 2.0, 2.0));
    assert!(result.trades.is_empty());
    assert_eq!(result.equity_curve, vec![0.0]);
}

#[test]
fn short_series_has_no_activity() {
    let params = StrategyParams::default();
    assert_eq!(simulate(&[], &params).equity_curve, vec![0.0]);
    assert!(simulate(&bars(&[5000.0]), &params).trades.is_empty());
}

#[test]
fn open_position_at_end_is_dropped() {
    //a long opens at bar 1 and never reaches either level
    let result = simulate(&bars(&[100.0, 101.0, 102.0, 103.0]), &StrategyParams::new(2, 10, 50.0, 50.0));
    assert!(result.trades.is_empty());
    assert_eq!(result.equity_curve, vec![0.0]);
}

#[test]
fn positions_never_flip_directly() {
    //oscillating prices with a tight bracket produce many trades
    let closes: Vec<f64> = (0..200)
        .map(|i| 5000.0 + 30.0 * ((i as f64) / 7.0).sin())
        .collect();
    let result = simulate(&bars(&closes), &StrategyParams::new(3, 12, 4.0, 4.0));

    assert!(result.trades.len() > 5);
    for pair in result.trades.windows(2) {
        assert!(pair[1].entry_index > pair[0].exit_index);
    }
    for trade in &result.trades {
        assert!(trade.profit >= 4.0 || trade.profit <= -4.0);
    }
    assert_equity_consistent(&result);
}

#[test]
fn summary_over_simulation() {
    let closes: Vec<f64> = (0..=30).map(|i| 100.0 + i as f64).collect();
    let result = simulate(&bars(&closes), &StrategyParams::new(5, 20, 10.0, 5.0));
    let summary = SummaryMetrics::from_result(&result, Some(&Market::Nq.contract()));

    assert_eq!(summary.num_trades, 5);
    assert_eq!(summary.num_winning_trades, 5);
    assert_eq!(summary.win_rate, 1.0);
    assert_eq!(summary.net_pnl, result.net_pnl());
    assert_eq!(summary.net_pnl_dollars, Some(500.0));
    assert_eq!(summary.max_drawdown, 0.0);
}
