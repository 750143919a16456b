use crate::data::bar::PriceBar;
use crate::data::provider::{DataError, DataSource};
use crate::instrument::Timeframe;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

//only timestamp and close are required, other columns (open, high, volume...) are ignored
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Datetime", alias = "Date", alias = "time")]
    timestamp: String,
    #[serde(alias = "Close")]
    close: Option<f64>,
    #[serde(default, alias = "Symbol")]
    symbol: Option<String>,
}

//parses rfc3339, "yyyy-mm-dd hh:mm:ss[+zz:zz]" or unix seconds
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(ts.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

//loads bars from a csv file, optionally keeping only rows for one symbol
pub fn load_csv<P: AsRef<Path>>(path: P, symbol: Option<&str>) -> Result<Vec<PriceBar>, DataError> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let mut bars = Vec::new();
    let mut skipped = 0usize;

    for (index, result) in reader.deserialize().enumerate() {
        let line = index + 2;
        let record: CsvRecord = result.map_err(|e| DataError::Parse {
            line,
            message: e.to_string(),
        })?;

        if let (Some(wanted), Some(actual)) = (symbol, record.symbol.as_deref()) {
            if !actual.eq_ignore_ascii_case(wanted) {
                continue;
            }
        }

        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| DataError::Parse {
            line,
            message: format!("invalid timestamp '{}'", record.timestamp),
        })?;

        //rows without a usable close are gaps in the provider's data
        let close = match record.close {
            Some(close) if close.is_finite() => close,
            _ => {
                skipped += 1;
                continue;
            }
        };

        bars.push(PriceBar::new_unchecked(timestamp, close));
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped rows without a close price");
    }

    //sort by timestamp to ensure chronological order
    bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    bars.dedup_by_key(|bar| bar.timestamp);

    debug!(path = %path.display(), bars = bars.len(), "loaded csv");
    Ok(bars)
}

/// Reads a previously exported series from disk.
///
/// The requested ticker is ignored unless a symbol filter was configured;
/// one file holds one series.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    symbol: Option<String>,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSource {
            path: path.into(),
            symbol: None,
        }
    }

    //keeps only rows whose symbol column matches
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for CsvSource {
    fn fetch(
        &self,
        ticker: &str,
        timeframe: Timeframe,
        period: &str,
    ) -> Result<Vec<PriceBar>, DataError> {
        let bars = load_csv(&self.path, self.symbol.as_deref())?;

        if bars.is_empty() {
            return Err(DataError::NoData {
                ticker: ticker.to_string(),
                interval: timeframe.as_str().to_string(),
                period: period.to_string(),
            });
        }

        Ok(bars)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
