use crate::instrument::FuturesContract;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//tradeable markets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    Es,
    Nq,
}

impl Market {
    pub const ALL: [Market; 2] = [Market::Es, Market::Nq];

    pub fn display_name(&self) -> &'static str {
        match self {
            Market::Es => "ES (S&P 500)",
            Market::Nq => "NQ (Nasdaq)",
        }
    }

    //continuous front-month ticker on yahoo
    pub fn ticker(&self) -> &'static str {
        match self {
            Market::Es => "ES=F",
            Market::Nq => "NQ=F",
        }
    }

    pub fn contract(&self) -> FuturesContract {
        match self {
            Market::Es => FuturesContract::es(),
            Market::Nq => FuturesContract::nq(),
        }
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "es" | "es=f" => Ok(Market::Es),
            "nq" | "nq=f" => Ok(Market::Nq),
            other => Err(format!("unknown market '{other}' (expected es or nq)")),
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

//intraday bar interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "2m")]
    M2,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::M1,
        Timeframe::M2,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M2 => "2m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
        }
    }

    //how far back the provider serves bars at this interval
    pub fn lookback_period(&self) -> &'static str {
        match self {
            Timeframe::M1 | Timeframe::M2 => "7d",
            Timeframe::M5 => "30d",
            Timeframe::M15 => "60d",
            Timeframe::M30 => "90d",
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s.trim())
            .ok_or_else(|| format!("unknown timeframe '{s}' (expected 1m, 2m, 5m, 15m or 30m)"))
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
