//an ema crossover bracket backtester for es and nq intraday futures data

pub mod config;
pub mod data;
pub mod engine;
pub mod instrument;
pub mod logging;
pub mod metrics;
pub mod portfolio;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{BacktestConfiguration, ConfigError, StrategyParams};
    pub use crate::data::{
        load_csv, CacheKey, CachedSource, CsvSource, DataError, DataSource, PriceBar, YahooSource,
    };
    pub use crate::engine::{simulate, sweep, SimulationResult, SweepGrid, SweepRow, Trade};
    pub use crate::instrument::{FuturesContract, Market, Timeframe};
    pub use crate::metrics::{
        calculate_equity_curve, save_equity_csv, save_series_csv, save_trades_csv, EquityPoint,
        SummaryMetrics,
    };
    pub use crate::portfolio::{OpenPosition, PositionState, Side};
    pub use crate::strategy::{ema, Bracket, EmaCrossover, ExitReason, SmoothedSeries, Smoothing};
}
