pub mod futures_contract;
pub mod market;

pub use futures_contract::FuturesContract;
pub use market::{Market, Timeframe};
