use crate::portfolio::Side;
use crate::strategy::{SmoothedSeries, Smoothing};
use serde::{Deserialize, Serialize};
use std::fmt;

//ema crossover entry rule
//goes long while the fast ema is above the slow ema
//goes short while the fast ema is below the slow ema
#[derive(Debug, Clone)]
pub struct EmaCrossover {
    fast_span: usize,
    slow_span: usize,
    series: SmoothedSeries,
}

impl EmaCrossover {
    pub fn new(closes: &[f64], fast_span: usize, slow_span: usize, smoothing: Smoothing) -> Self {
        EmaCrossover {
            fast_span,
            slow_span,
            series: SmoothedSeries::compute(closes, fast_span, slow_span, smoothing),
        }
    }

    //returns the side to open at bar i, none when the averages are equal
    pub fn entry_signal(&self, i: usize) -> Option<Side> {
        let fast = *self.series.fast.get(i)?;
        let slow = *self.series.slow.get(i)?;

        if fast > slow {
            Some(Side::Long)
        } else if fast < slow {
            Some(Side::Short)
        } else {
            //equal (or nan) stays flat
            None
        }
    }

    pub fn series(&self) -> &SmoothedSeries {
        &self.series
    }

    pub fn into_series(self) -> SmoothedSeries {
        self.series
    }

    pub fn fast_span(&self) -> usize {
        self.fast_span
    }

    pub fn slow_span(&self) -> usize {
        self.slow_span
    }
}

//why a position was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::TakeProfit => f.write_str("take_profit"),
            ExitReason::StopLoss => f.write_str("stop_loss"),
        }
    }
}

//fixed stop-loss / take-profit distances in price points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl Bracket {
    pub fn new(stop_loss: f64, take_profit: f64) -> Self {
        Bracket {
            stop_loss,
            take_profit,
        }
    }

    //take-profit is checked first, both are inclusive
    pub fn check(&self, profit: f64) -> Option<ExitReason> {
        if profit >= self.take_profit {
            Some(ExitReason::TakeProfit)
        } else if profit <= -self.stop_loss {
            Some(ExitReason::StopLoss)
        } else {
            None
        }
    }
}
