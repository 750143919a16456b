use serde::{Deserialize, Serialize};

//a point in the equity curve, one per closed trade plus the starting point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub trade: usize,
    pub equity: f64,
    //distance below the running peak, in price points
    pub drawdown: f64,
}

impl EquityPoint {
    pub fn new(trade: usize, equity: f64, drawdown: f64) -> Self {
        EquityPoint {
            trade,
            equity,
            drawdown,
        }
    }
}

//annotates a cumulative pnl curve with drawdowns from its running peak
pub fn calculate_equity_curve(equity_values: &[f64]) -> Vec<EquityPoint> {
    let mut curve = Vec::with_capacity(equity_values.len());
    let mut peak = f64::NEG_INFINITY;

    for (trade, &equity) in equity_values.iter().enumerate() {
        //update peak
        if equity > peak {
            peak = equity;
        }

        curve.push(EquityPoint::new(trade, equity, peak - equity));
    }

    curve
}

//calculates maximum drawdown from equity curve
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    equity_curve
        .iter()
        .map(|point| point.drawdown)
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawdown_is_measured_from_running_peak() {
        let curve = calculate_equity_curve(&[0.0, 20.0, 10.0, 30.0, 5.0, 15.0]);
        let drawdowns: Vec<f64> = curve.iter().map(|p| p.drawdown).collect();
        assert_eq!(drawdowns, vec![0.0, 0.0, 10.0, 0.0, 25.0, 15.0]);
        assert_eq!(max_drawdown(&curve), 25.0);
        assert_eq!(curve[4].trade, 4);
    }

    #[test]
    fn losing_from_start_counts_as_drawdown() {
        let curve = calculate_equity_curve(&[0.0, -10.0, -20.0]);
        assert_eq!(max_drawdown(&curve), 20.0);
    }

    #[test]
    fn empty_curve() {
        assert!(calculate_equity_curve(&[]).is_empty());
        assert_eq!(max_drawdown(&[]), 0.0);
    }
}
