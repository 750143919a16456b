use crate::engine::SimulationResult;
use crate::instrument::FuturesContract;
use crate::metrics::timeseries::{calculate_equity_curve, max_drawdown};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary metrics for a simulation, amounts in price points unless noted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub num_trades: usize,
    pub num_winning_trades: usize,
    pub num_losing_trades: usize,
    pub net_pnl: f64,
    //net pnl for one contract, when a contract was given
    pub net_pnl_dollars: Option<f64>,
    //fraction of trades with positive profit, 0 without trades
    pub win_rate: f64,
    pub avg_trade: f64,
    pub trade_std_dev: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub profit_factor: f64,
    pub max_drawdown: f64,
}

impl SummaryMetrics {
    //calculate summary metrics from a simulation result
    pub fn from_result(result: &SimulationResult, contract: Option<&FuturesContract>) -> Self {
        let profits = result.profits();
        let stats = calculate_trade_statistics(&profits);

        let net_pnl = result.net_pnl();
        let curve = calculate_equity_curve(&result.equity_curve);

        SummaryMetrics {
            num_trades: stats.num_trades,
            num_winning_trades: stats.num_winning_trades,
            num_losing_trades: stats.num_losing_trades,
            net_pnl,
            net_pnl_dollars: contract.map(|c| c.points_to_dollars(net_pnl)),
            win_rate: stats.win_rate,
            avg_trade: stats.avg_trade,
            trade_std_dev: stats.trade_std_dev,
            avg_win: stats.avg_win,
            avg_loss: stats.avg_loss,
            largest_win: stats.largest_win,
            largest_loss: stats.largest_loss,
            profit_factor: stats.profit_factor,
            max_drawdown: max_drawdown(&curve),
        }
    }

    //builds the metrics table
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        table.add_row(Row::new(vec![
            Cell::new("Net PnL"),
            Cell::new(&format!("{:.2}", self.net_pnl)),
        ]));

        if let Some(dollars) = self.net_pnl_dollars {
            table.add_row(Row::new(vec![
                Cell::new("Net PnL (1 contract)"),
                Cell::new(&format!("${:.2}", dollars)),
            ]));
        }

        table.add_row(Row::new(vec![
            Cell::new("Trades"),
            Cell::new(&format!("{}", self.num_trades)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Win Rate"),
            Cell::new(&format!("{:.1}%", self.win_rate * 100.0)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Wins"),
            Cell::new(&format!("{}", self.num_winning_trades)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Losses"),
            Cell::new(&format!("{}", self.num_losing_trades)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg Trade"),
            Cell::new(&format!("{:.2} (sd {:.2})", self.avg_trade, self.trade_std_dev)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg Win / Avg Loss"),
            Cell::new(&format!("{:.2} / {:.2}", self.avg_win, self.avg_loss)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Largest Win / Loss"),
            Cell::new(&format!("{:.2} / {:.2}", self.largest_win, self.largest_loss)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Profit Factor"),
            Cell::new(&format!("{:.3}", self.profit_factor)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Max Drawdown"),
            Cell::new(&format!("{:.2}", self.max_drawdown)),
        ]));

        table
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        self.to_table().printstd();
    }
}

struct TradeStats {
    num_trades: usize,
    num_winning_trades: usize,
    num_losing_trades: usize,
    win_rate: f64,
    avg_trade: f64,
    trade_std_dev: f64,
    avg_win: f64,
    avg_loss: f64,
    profit_factor: f64,
    largest_win: f64,
    largest_loss: f64,
}

fn calculate_trade_statistics(profits: &[f64]) -> TradeStats {
    if profits.is_empty() {
        return TradeStats {
            num_trades: 0,
            num_winning_trades: 0,
            num_losing_trades: 0,
            win_rate: 0.0,
            avg_trade: 0.0,
            trade_std_dev: 0.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            profit_factor: 0.0,
            largest_win: 0.0,
            largest_loss: 0.0,
        };
    }

    let winning_trades: Vec<f64> = profits.iter().filter(|&&p| p > 0.0).copied().collect();
    let losing_trades: Vec<f64> = profits.iter().filter(|&&p| p < 0.0).copied().collect();

    let num_winning = winning_trades.len();
    let num_losing = losing_trades.len();
    let total = profits.len();

    let win_rate = num_winning as f64 / total as f64;

    let avg_trade = profits.mean();

    //sample std dev needs two trades
    let trade_std_dev = if total > 1 { profits.std_dev() } else { 0.0 };

    let avg_win = if num_winning > 0 {
        winning_trades.iter().sum::<f64>() / num_winning as f64
    } else {
        0.0
    };

    let avg_loss = if num_losing > 0 {
        losing_trades.iter().sum::<f64>() / num_losing as f64
    } else {
        0.0
    };

    let total_wins: f64 = winning_trades.iter().sum();
    let total_losses: f64 = losing_trades.iter().sum::<f64>().abs();

    let profit_factor = if total_losses > 0.0 {
        total_wins / total_losses
    } else if total_wins > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let largest_win = winning_trades.iter().fold(0.0f64, |a, &b| a.max(b));
    let largest_loss = losing_trades.iter().fold(0.0f64, |a, &b| a.min(b));

    TradeStats {
        num_trades: total,
        num_winning_trades: num_winning,
        num_losing_trades: num_losing,
        win_rate,
        avg_trade,
        trade_std_dev,
        avg_win,
        avg_loss,
        profit_factor,
        largest_win,
        largest_loss,
    }
}
