pub mod bar;
pub mod loader;
pub mod provider;
pub mod yahoo;

pub use bar::{check_ordering, closes, BarError, PriceBar};
pub use loader::{load_csv, CsvSource};
pub use provider::{CacheKey, CachedSource, DataError, DataSource};
pub use yahoo::YahooSource;
