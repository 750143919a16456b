use crate::data::PriceBar;
use crate::engine::SimulationResult;
use crate::metrics::timeseries::calculate_equity_curve;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct TradeRow<'a> {
    index: usize,
    side: String,
    entry_index: usize,
    exit_index: usize,
    entry_time: String,
    exit_time: String,
    entry_price: f64,
    exit_price: f64,
    profit: f64,
    exit_reason: &'a str,
}

#[derive(Serialize)]
struct SeriesRow {
    timestamp: String,
    close: f64,
    ema_fast: f64,
    ema_slow: f64,
}

//writes trade,equity,drawdown rows
pub fn save_equity_csv(result: &SimulationResult, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;

    for point in calculate_equity_curve(&result.equity_curve) {
        writer.serialize(point)?;
    }

    writer.flush()?;
    Ok(())
}

//writes one row per closed trade
pub fn save_trades_csv(result: &SimulationResult, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;

    for (index, trade) in result.trades.iter().enumerate() {
        let reason = trade.exit_reason.to_string();
        writer.serialize(TradeRow {
            index,
            side: trade.side.to_string(),
            entry_index: trade.entry_index,
            exit_index: trade.exit_index,
            entry_time: trade.entry_time.to_rfc3339(),
            exit_time: trade.exit_time.to_rfc3339(),
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            profit: trade.profit,
            exit_reason: &reason,
        })?;
    }

    writer.flush()?;
    Ok(())
}

//writes the close price with both averages, the data behind a price chart
pub fn save_series_csv(bars: &[PriceBar], result: &SimulationResult, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;

    let series = &result.series;
    for ((bar, &ema_fast), &ema_slow) in bars.iter().zip(&series.fast).zip(&series.slow) {
        writer.serialize(SeriesRow {
            timestamp: bar.timestamp.to_rfc3339(),
            close: bar.close,
            ema_fast,
            ema_slow,
        })?;
    }

    writer.flush()?;
    Ok(())
}
