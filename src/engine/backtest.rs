use crate::config::StrategyParams;
use crate::data::{closes, PriceBar};
use crate::portfolio::{PositionState, Side};
use crate::strategy::{EmaCrossover, ExitReason, SmoothedSeries};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

//a closed position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub side: Side,
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    //signed profit in price points
    pub profit: f64,
    pub exit_reason: ExitReason,
}

//result of a simulation
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub trades: Vec<Trade>,
    //cumulative profit after each trade, starts at 0.0, len = trades + 1
    pub equity_curve: Vec<f64>,
    pub series: SmoothedSeries,
}

impl SimulationResult {
    //realized profit of each trade in order
    pub fn profits(&self) -> Vec<f64> {
        self.trades.iter().map(|t| t.profit).collect()
    }

    pub fn net_pnl(&self) -> f64 {
        self.equity_curve.last().copied().unwrap_or(0.0)
    }
}

/// Walks the series once with the EMA crossover entry and bracket exit.
///
/// Bar 0 is never acted on. A flat position opens on the side the fast
/// average sits relative to the slow one; an open position closes on the
/// first bar whose close reaches either bracket level. A bar that closes a
/// position never opens one, and a position still open at the last bar is
/// dropped without a trade.
pub fn simulate(bars: &[PriceBar], params: &StrategyParams) -> SimulationResult {
    let prices = closes(bars);
    let rule = EmaCrossover::new(&prices, params.fast_span, params.slow_span, params.smoothing);
    let bracket = params.bracket();

    let mut state = PositionState::Flat;
    let mut trades = Vec::new();
    let mut equity_curve = vec![0.0];

    for (i, &price) in prices.iter().enumerate().skip(1) {
        match state {
            PositionState::Flat => {
                if let Some(side) = rule.entry_signal(i) {
                    debug!(index = i, %side, price, "open");
                    state.open(side, price, i);
                }
            }
            PositionState::Open(open) => {
                let profit = open.profit_at(price);

                let Some(exit_reason) = bracket.check(profit) else {
                    continue;
                };

                state.close();
                let equity = equity_curve.last().copied().unwrap_or(0.0) + profit;
                equity_curve.push(equity);

                debug!(index = i, side = %open.side, price, profit, %exit_reason, "close");
                trades.push(Trade {
                    side: open.side,
                    entry_index: open.entry_index,
                    exit_index: i,
                    entry_time: bars[open.entry_index].timestamp,
                    exit_time: bars[i].timestamp,
                    entry_price: open.entry_price,
                    exit_price: price,
                    profit,
                    exit_reason,
                });
            }
        }
    }

    if let Some(side) = state.side() {
        debug!(%side, entry_price = state.entry_price(), "dropping open position at end of data");
    }

    info!(
        bars = bars.len(),
        fast = params.fast_span,
        slow = params.slow_span,
        trades = trades.len(),
        net = equity_curve.last().copied().unwrap_or(0.0),
        "simulation complete"
    );

    SimulationResult {
        trades,
        equity_curve,
        series: rule.into_series(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let ts = Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap();
                PriceBar::new_unchecked(ts, c)
            })
            .collect()
    }

    #[test]
    fn empty_and_single_bar_produce_no_trades() {
        let params = StrategyParams::new(5, 20, 10.0, 5.0);
        for series in [bars(&[]), bars(&[100.0])] {
            let result = simulate(&series, &params);
            assert!(result.trades.is_empty());
            assert_eq!(result.equity_curve, vec![0.0]);
        }
    }

    #[test]
    fn long_take_profit_records_trade_metadata() {
        let series = bars(&[100.0, 101.0, 103.0, 106.0, 107.0]);
        let result = simulate(&series, &StrategyParams::new(2, 10, 10.0, 5.0));

        let trade = &result.trades[0];
        assert_eq!(trade.side, Side::Long);
        assert_eq!((trade.entry_index, trade.exit_index), (1, 3));
        assert_eq!(trade.entry_price, 101.0);
        assert_eq!(trade.exit_price, 106.0);
        assert_eq!(trade.profit, 5.0);
        assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
        assert_eq!(trade.exit_time, series[3].timestamp);
        assert_eq!(result.equity_curve[..2], [0.0, 5.0]);
    }

    #[test]
    fn closing_bar_does_not_reopen() {
        //bar 3 closes the long; bar 4 opens the next one
        let series = bars(&[100.0, 101.0, 103.0, 106.0, 107.0, 108.0]);
        let result = simulate(&series, &StrategyParams::new(2, 10, 10.0, 5.0));
        assert_eq!(result.trades.len(), 1);
        //the second long (entry 107) is still open at the end and dropped
        assert_eq!(result.equity_curve, vec![0.0, 5.0]);
    }

    #[test]
    fn series_is_aligned_with_input() {
        let series = bars(&[1.0, 2.0, 3.0, 4.0]);
        let result = simulate(&series, &StrategyParams::new(2, 3, 1.0, 1.0));
        assert_eq!(result.series.fast.len(), 4);
        assert_eq!(result.series.slow.len(), 4);
        assert_eq!(result.net_pnl(), result.profits().iter().sum::<f64>());
    }
}
