pub mod ema_crossover;

pub use ema_crossover::{Bracket, EmaCrossover, ExitReason};

use serde::{Deserialize, Serialize};

//how the exponential average weights its history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoothing {
    //weighted mean of all observations with weights (1 - alpha)^age
    #[default]
    Adjusted,
    //classic ema[t] = alpha * x[t] + (1 - alpha) * ema[t - 1]
    Recursive,
}

impl std::str::FromStr for Smoothing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "adjusted" => Ok(Smoothing::Adjusted),
            "recursive" => Ok(Smoothing::Recursive),
            other => Err(format!("unknown smoothing '{other}' (expected adjusted or recursive)")),
        }
    }
}

//smoothing factor for a span, spans below 1 are treated as 1
pub fn alpha(span: usize) -> f64 {
    2.0 / (span.max(1) as f64 + 1.0)
}

/// Exponential moving average of `values`, defined from index 0.
///
/// Both forms seed at the first value. The adjusted form normalizes by the
/// sum of weights seen so far, so early values lean on the few observations
/// available instead of on the seed.
pub fn ema(values: &[f64], span: usize, smoothing: Smoothing) -> Vec<f64> {
    let mut result = Vec::with_capacity(values.len());
    let Some(&first) = values.first() else {
        return result;
    };

    let alpha = alpha(span);
    let decay = 1.0 - alpha;

    let mut prev = first;
    let mut weight_sum = 1.0;
    result.push(prev);

    for &value in &values[1..] {
        //written as a step toward the new value so a constant input stays exact
        let step = match smoothing {
            Smoothing::Adjusted => {
                weight_sum = 1.0 + decay * weight_sum;
                1.0 / weight_sum
            }
            Smoothing::Recursive => alpha,
        };
        prev += (value - prev) * step;
        result.push(prev);
    }

    result
}

//fast and slow averages aligned 1:1 with the price series
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedSeries {
    pub fast: Vec<f64>,
    pub slow: Vec<f64>,
}

impl SmoothedSeries {
    pub fn compute(closes: &[f64], fast_span: usize, slow_span: usize, smoothing: Smoothing) -> Self {
        SmoothedSeries {
            fast: ema(closes, fast_span, smoothing),
            slow: ema(closes, slow_span, smoothing),
        }
    }

    pub fn len(&self) -> usize {
        self.fast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fast.is_empty()
    }
}
