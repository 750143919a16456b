pub mod backtest;
pub mod sweep;

pub use backtest::{simulate, SimulationResult, Trade};
pub use sweep::{sweep, SweepGrid, SweepRow};
