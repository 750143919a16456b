//! Yahoo Finance intraday data source.
//!
//! Uses the v8 chart API with a `range`/`interval` pair, which is how
//! Yahoo bounds intraday history (1m bars only go back about a week).
//! Yahoo has no official API; the CSV source is the fallback.

use crate::data::bar::PriceBar;
use crate::data::provider::{DataError, DataSource};
use crate::instrument::Timeframe;
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

pub struct YahooSource {
    client: reqwest::blocking::Client,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooSource {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(BASE_URL)
    }

    //points the source at another host, used by tests and mirrors
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Network(e.to_string()))?;

        Ok(YahooSource {
            client,
            base_url: base_url.into(),
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        })
    }

    fn chart_url(&self, ticker: &str, timeframe: Timeframe, period: &str) -> String {
        format!(
            "{}/{}?range={}&interval={}&includePrePost=false",
            self.base_url,
            ticker,
            period,
            timeframe.as_str()
        )
    }

    fn parse_response(ticker: &str, resp: ChartResponse) -> Result<Vec<PriceBar>, DataError> {
        let result = match resp.chart.result {
            Some(result) => result,
            None => {
                return Err(match resp.chart.error {
                    Some(err) => DataError::Provider {
                        code: err.code,
                        description: err.description,
                    },
                    None => DataError::ResponseFormat(format!(
                        "empty result with no error for {ticker}"
                    )),
                })
            }
        };

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormat("result array is empty".into()))?;

        //a range with no trading returns no timestamp array at all
        let timestamps = data.timestamp.unwrap_or_default();

        let closes = data
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let timestamp = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| DataError::ResponseFormat(format!("invalid timestamp: {ts}")))?;

            //yahoo pads halts and the current forming bar with nulls
            if let Some(close) = closes.get(i).copied().flatten() {
                if close.is_finite() {
                    bars.push(PriceBar::new_unchecked(timestamp, close));
                }
            }
        }

        bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        bars.dedup_by_key(|bar| bar.timestamp);
        Ok(bars)
    }

    fn fetch_with_retry(&self, url: &str) -> Result<ChartResponse, DataError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(attempt, ?delay, "retrying chart request");
                std::thread::sleep(delay);
            }

            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
                    {
                        warn!(%status, "chart request failed");
                        last_error = Some(DataError::Network(format!("HTTP {status}")));
                        continue;
                    }

                    //yahoo reports unknown tickers as 404 with an error body
                    if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
                        return Err(DataError::Network(format!("HTTP {status}")));
                    }

                    return resp
                        .json::<ChartResponse>()
                        .map_err(|e| DataError::ResponseFormat(e.to_string()));
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::Network(e.to_string()));
                }
                Err(e) => return Err(DataError::Network(e.to_string())),
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::Network("max retries exceeded".into())))
    }
}

impl DataSource for YahooSource {
    fn fetch(
        &self,
        ticker: &str,
        timeframe: Timeframe,
        period: &str,
    ) -> Result<Vec<PriceBar>, DataError> {
        let url = self.chart_url(ticker, timeframe, period);
        info!(ticker, interval = timeframe.as_str(), period, "downloading bars");

        let chart = self.fetch_with_retry(&url)?;
        let bars = Self::parse_response(ticker, chart)?;

        if bars.is_empty() {
            return Err(DataError::NoData {
                ticker: ticker.to_string(),
                interval: timeframe.as_str().to_string(),
                period: period.to_string(),
            });
        }

        info!(ticker, bars = bars.len(), "download complete");
        Ok(bars)
    }

    fn name(&self) -> &str {
        "yahoo_finance"
    }
}
