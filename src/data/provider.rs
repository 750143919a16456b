//! Data source abstraction for intraday bars.
//!
//! The simulator only ever sees a `[PriceBar]`. Where the bars come from
//! (Yahoo's chart API, a CSV export) is hidden behind [`DataSource`], and
//! repeated requests for the same series can be memoized with
//! [`CachedSource`].

use crate::data::bar::PriceBar;
use crate::instrument::Timeframe;
use indexmap::IndexMap;
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("No data available for {ticker} ({interval}, {period})")]
    NoData {
        ticker: String,
        interval: String,
        period: String,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response format: {0}")]
    ResponseFormat(String),

    #[error("provider error {code}: {description}")]
    Provider { code: String, description: String },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse record at line {line}: {message}")]
    Parse { line: usize, message: String },
}

//anything that can produce an ordered price series for a ticker
pub trait DataSource: Send + Sync {
    //fetches bars sorted ascending by timestamp
    fn fetch(&self, ticker: &str, timeframe: Timeframe, period: &str)
        -> Result<Vec<PriceBar>, DataError>;

    //returns the source name
    fn name(&self) -> &str;
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn fetch(
        &self,
        ticker: &str,
        timeframe: Timeframe,
        period: &str,
    ) -> Result<Vec<PriceBar>, DataError> {
        (**self).fetch(ticker, timeframe, period)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

//cache key for a fetched series
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub ticker: String,
    pub timeframe: Timeframe,
    pub period: String,
}

impl CacheKey {
    pub fn new(ticker: &str, timeframe: Timeframe, period: &str) -> Self {
        CacheKey {
            ticker: ticker.to_string(),
            timeframe,
            period: period.to_string(),
        }
    }
}

/// Memoizes another source for the lifetime of this value.
///
/// Entries are kept in insertion order; once `capacity` is reached the
/// oldest entry is evicted. Nothing is persisted, so a new process always
/// starts cold. Failed fetches are not cached.
pub struct CachedSource<S> {
    inner: S,
    capacity: usize,
    entries: Mutex<IndexMap<CacheKey, Vec<PriceBar>>>,
}

impl<S: DataSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, 16)
    }

    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        CachedSource {
            inner,
            capacity: capacity.max(1),
            entries: Mutex::new(IndexMap::new()),
        }
    }

    //drops a single cached series, returning true if it was present
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.lock().shift_remove(key).is_some()
    }

    //drops every cached series
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IndexMap<CacheKey, Vec<PriceBar>>> {
        //a poisoned cache only ever holds complete entries
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S: DataSource> DataSource for CachedSource<S> {
    fn fetch(
        &self,
        ticker: &str,
        timeframe: Timeframe,
        period: &str,
    ) -> Result<Vec<PriceBar>, DataError> {
        let key = CacheKey::new(ticker, timeframe, period);

        if let Some(bars) = self.lock().get(&key) {
            debug!(ticker, interval = timeframe.as_str(), period, "cache hit");
            return Ok(bars.clone());
        }

        debug!(ticker, interval = timeframe.as_str(), period, "cache miss");
        let bars = self.inner.fetch(ticker, timeframe, period)?;

        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.shift_remove_index(0);
        }
        entries.insert(key, bars.clone());

        Ok(bars)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
