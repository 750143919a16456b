//! Parallel parameter sweep.
//!
//! Every combination runs its own [`simulate`] call with its own position
//! state, so the runs share nothing but the read-only bars.

use crate::config::{ConfigError, StrategyParams};
use crate::data::PriceBar;
use crate::engine::backtest::simulate;
use crate::metrics::SummaryMetrics;
use crate::strategy::Smoothing;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

//cartesian grid of strategy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepGrid {
    pub fast_spans: Vec<usize>,
    pub slow_spans: Vec<usize>,
    pub stop_losses: Vec<f64>,
    pub take_profits: Vec<f64>,
    #[serde(default)]
    pub smoothing: Smoothing,
}

impl SweepGrid {
    //number of combinations in the grid
    pub fn len(&self) -> usize {
        self.fast_spans.len() * self.slow_spans.len() * self.stop_losses.len() * self.take_profits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    //combinations in fast, slow, stop, target order
    pub fn combinations(&self) -> Vec<StrategyParams> {
        let mut params = Vec::with_capacity(self.len());
        for &fast in &self.fast_spans {
            for &slow in &self.slow_spans {
                for &stop_loss in &self.stop_losses {
                    for &take_profit in &self.take_profits {
                        params.push(
                            StrategyParams::new(fast, slow, stop_loss, take_profit)
                                .with_smoothing(self.smoothing),
                        );
                    }
                }
            }
        }
        params
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dimensions = [
            ("fast_spans", self.fast_spans.is_empty()),
            ("slow_spans", self.slow_spans.is_empty()),
            ("stop_losses", self.stop_losses.is_empty()),
            ("take_profits", self.take_profits.is_empty()),
        ];
        for (name, empty) in dimensions {
            if empty {
                return Err(ConfigError::EmptyGrid { name });
            }
        }
        self.combinations().iter().try_for_each(StrategyParams::validate)
    }
}

//one sweep result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRow {
    pub params: StrategyParams,
    pub summary: SummaryMetrics,
}

//runs every grid combination in parallel, best net pnl first
pub fn sweep(bars: &[PriceBar], grid: &SweepGrid) -> Result<Vec<SweepRow>, ConfigError> {
    grid.validate()?;

    info!(combinations = grid.len(), bars = bars.len(), "starting sweep");

    let mut rows: Vec<SweepRow> = grid
        .combinations()
        .into_par_iter()
        .map(|params| {
            let result = simulate(bars, &params);
            SweepRow {
                params,
                summary: SummaryMetrics::from_result(&result, None),
            }
        })
        .collect();

    //stable, so ties keep grid order
    rows.sort_by(|a, b| b.summary.net_pnl.total_cmp(&a.summary.net_pnl));

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn rising(n: usize) -> Vec<PriceBar> {
        (0..n)
            .map(|i| {
                let ts = Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap();
                PriceBar::new_unchecked(ts, 100.0 + i as f64)
            })
            .collect()
    }

    fn grid() -> SweepGrid {
        SweepGrid {
            fast_spans: vec![5, 10],
            slow_spans: vec![20],
            stop_losses: vec![10.0],
            take_profits: vec![2.0, 5.0],
            smoothing: Smoothing::Adjusted,
        }
    }

    #[test]
    fn combinations_cover_grid() {
        let grid = grid();
        let combos = grid.combinations();
        assert_eq!(combos.len(), 4);
        assert_eq!(grid.len(), 4);
        assert_eq!((combos[1].fast_span, combos[1].take_profit), (5, 5.0));
        assert_eq!((combos[2].fast_span, combos[2].take_profit), (10, 2.0));
    }

    #[test]
    fn empty_dimension_is_rejected() {
        let mut grid = grid();
        grid.take_profits.clear();
        assert_eq!(
            sweep(&rising(10), &grid).unwrap_err(),
            ConfigError::EmptyGrid {
                name: "take_profits"
            }
        );
    }

    #[test]
    fn invalid_combination_is_rejected() {
        let mut grid = grid();
        grid.stop_losses.push(0.0);
        assert!(matches!(
            sweep(&rising(10), &grid),
            Err(ConfigError::InvalidDistance { .. })
        ));
    }

    #[test]
    fn rows_are_sorted_by_net_pnl() {
        let rows = sweep(&rising(31), &grid()).unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows
            .windows(2)
            .all(|w| w[0].summary.net_pnl >= w[1].summary.net_pnl));
    }

    #[test]
    fn matches_individual_runs() {
        let bars = rising(31);
        let rows = sweep(&bars, &grid()).unwrap();
        for row in rows {
            let single = simulate(&bars, &row.params);
            assert_eq!(row.summary.num_trades, single.trades.len());
            assert_eq!(row.summary.net_pnl, single.net_pnl());
        }
    }
}
