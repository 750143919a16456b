use crate::instrument::{Market, Timeframe};
use crate::strategy::{Bracket, Smoothing};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} span must be at least 1")]
    ZeroSpan { name: &'static str },
    #[error("{name} must be a positive, finite distance (got {value})")]
    InvalidDistance { name: &'static str, value: f64 },
    #[error("sweep grid dimension '{name}' is empty")]
    EmptyGrid { name: &'static str },
}

//ema crossover and bracket parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub fast_span: usize,
    pub slow_span: usize,
    //distances in price points, not percentages
    pub stop_loss: f64,
    pub take_profit: f64,
    #[serde(default)]
    pub smoothing: Smoothing,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            fast_span: 20,
            slow_span: 50,
            stop_loss: 10.0,
            take_profit: 20.0,
            smoothing: Smoothing::Adjusted,
        }
    }
}

impl StrategyParams {
    pub fn new(fast_span: usize, slow_span: usize, stop_loss: f64, take_profit: f64) -> Self {
        StrategyParams {
            fast_span,
            slow_span,
            stop_loss,
            take_profit,
            smoothing: Smoothing::default(),
        }
    }

    pub fn with_smoothing(mut self, smoothing: Smoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn bracket(&self) -> Bracket {
        Bracket::new(self.stop_loss, self.take_profit)
    }

    //fast >= slow is allowed, it just inverts the signal
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fast_span == 0 {
            return Err(ConfigError::ZeroSpan { name: "fast" });
        }
        if self.slow_span == 0 {
            return Err(ConfigError::ZeroSpan { name: "slow" });
        }
        check_distance("stop_loss", self.stop_loss)?;
        check_distance("take_profit", self.take_profit)?;
        Ok(())
    }
}

fn check_distance(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDistance { name, value })
    }
}

//complete backtest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfiguration {
    //data
    pub market: Market,
    pub timeframe: Timeframe,
    //read bars from this csv instead of downloading
    #[serde(default)]
    pub data_path: Option<PathBuf>,

    //strategy
    #[serde(default)]
    pub strategy: StrategyParams,

    //optional output paths
    #[serde(default)]
    pub output_equity_csv: Option<PathBuf>,
    #[serde(default)]
    pub output_trades_csv: Option<PathBuf>,
    #[serde(default)]
    pub output_series_csv: Option<PathBuf>,
}

impl Default for BacktestConfiguration {
    fn default() -> Self {
        BacktestConfiguration {
            market: Market::Es,
            timeframe: Timeframe::M1,
            data_path: None,
            strategy: StrategyParams::default(),
            output_equity_csv: None,
            output_trades_csv: None,
            output_series_csv: None,
        }
    }
}

impl BacktestConfiguration {
    //lookback period requested from the data source
    pub fn period(&self) -> &'static str {
        self.timeframe.lookback_period()
    }

    //load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: BacktestConfiguration = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
