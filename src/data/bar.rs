use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum BarError {
    #[error("Non-finite close price: {0}")]
    NonFiniteClose(f64),
    #[error("Timestamps out of order at index {index}: {previous} >= {current}")]
    OutOfOrder {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
}

//one sample of the price series fed to the simulator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PriceBar {
    //creates a new PriceBar, rejecting nan and infinite closes
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Result<Self, BarError> {
        if !close.is_finite() {
            return Err(BarError::NonFiniteClose(close));
        }

        Ok(PriceBar { timestamp, close })
    }

    //creates a PriceBar without validation
    pub fn new_unchecked(timestamp: DateTime<Utc>, close: f64) -> Self {
        PriceBar { timestamp, close }
    }
}

//extracts the close prices of a series
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|bar| bar.close).collect()
}

//checks that timestamps are strictly increasing
pub fn check_ordering(bars: &[PriceBar]) -> Result<(), BarError> {
    for (index, pair) in bars.windows(2).enumerate() {
        if pair[0].timestamp >= pair[1].timestamp {
            return Err(BarError::OutOfOrder {
                index: index + 1,
                previous: pair[0].timestamp,
                current: pair[1].timestamp,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + minute * 60, 0).unwrap()
    }

    #[test]
    fn rejects_nan_close() {
        assert!(matches!(
            PriceBar::new(at(0), f64::NAN),
            Err(BarError::NonFiniteClose(_))
        ));
        assert!(PriceBar::new(at(0), f64::INFINITY).is_err());
        assert!(PriceBar::new(at(0), 4500.25).is_ok());
    }

    #[test]
    fn ordering_check_flags_duplicates() {
        let bars = vec![
            PriceBar::new_unchecked(at(0), 1.0),
            PriceBar::new_unchecked(at(1), 2.0),
            PriceBar::new_unchecked(at(1), 3.0),
        ];
        let err = check_ordering(&bars).unwrap_err();
        assert!(matches!(err, BarError::OutOfOrder { index: 2, .. }));
        assert!(check_ordering(&bars[..2]).is_ok());
        assert!(check_ordering(&[]).is_ok());
    }
}
