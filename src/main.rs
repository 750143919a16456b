use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pozole::logging::{init_tracing, LogFormat};
use pozole::prelude::*;
use prettytable::{Cell, Row, Table};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "pozole")]
#[command(about = "EMA crossover bracket backtester for ES and NQ futures", long_about = None)]
struct Cli {
    //log level, overridden by POZOLE_LOG
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    //log output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    //json configuration file, flags given on the command line win
    #[arg(long)]
    config: Option<PathBuf>,

    //market to trade (es, nq)
    #[arg(long)]
    market: Option<Market>,

    //bar interval (1m, 2m, 5m, 15m, 30m)
    #[arg(long)]
    timeframe: Option<Timeframe>,

    //read bars from a csv file instead of downloading
    #[arg(long)]
    data: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    //run a single backtest
    Run {
        #[command(flatten)]
        data: DataArgs,

        //fast ema span
        #[arg(long)]
        fast: Option<usize>,

        //slow ema span
        #[arg(long)]
        slow: Option<usize>,

        //stop loss in points
        #[arg(long)]
        stop_loss: Option<f64>,

        //take profit in points
        #[arg(long)]
        take_profit: Option<f64>,

        //ema weighting (adjusted, recursive)
        #[arg(long)]
        smoothing: Option<Smoothing>,

        //output path for equity curve csv
        #[arg(long)]
        output_equity_csv: Option<PathBuf>,

        //output path for trades csv
        #[arg(long)]
        output_trades_csv: Option<PathBuf>,

        //output path for price and ema series csv
        #[arg(long)]
        output_series_csv: Option<PathBuf>,

        //write the effective configuration to this json file
        #[arg(long)]
        save_config: Option<PathBuf>,
    },

    //run a parameter grid in parallel
    Sweep {
        #[command(flatten)]
        data: DataArgs,

        //fast ema spans, comma separated
        #[arg(long, value_delimiter = ',', default_value = "5,10,20,30,50")]
        fast: Vec<usize>,

        //slow ema spans, comma separated
        #[arg(long, value_delimiter = ',', default_value = "20,50,100,200")]
        slow: Vec<usize>,

        //stop losses in points, comma separated
        #[arg(long, value_delimiter = ',', default_value = "5,10,20")]
        stop_loss: Vec<f64>,

        //take profits in points, comma separated
        #[arg(long, value_delimiter = ',', default_value = "10,20,40")]
        take_profit: Vec<f64>,

        //ema weighting (adjusted, recursive)
        #[arg(long, default_value = "adjusted")]
        smoothing: Smoothing,

        //number of rows to print
        #[arg(long, default_value = "10")]
        top: usize,

        //output path for the full result csv
        #[arg(long)]
        output_csv: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format)?;

    match cli.command {
        Commands::Run {
            data,
            fast,
            slow,
            stop_loss,
            take_profit,
            smoothing,
            output_equity_csv,
            output_trades_csv,
            output_series_csv,
            save_config,
        } => {
            let mut config = base_configuration(&data)?;

            let params = &mut config.strategy;
            params.fast_span = fast.unwrap_or(params.fast_span);
            params.slow_span = slow.unwrap_or(params.slow_span);
            params.stop_loss = stop_loss.unwrap_or(params.stop_loss);
            params.take_profit = take_profit.unwrap_or(params.take_profit);
            params.smoothing = smoothing.unwrap_or(params.smoothing);

            if output_equity_csv.is_some() {
                config.output_equity_csv = output_equity_csv;
            }
            if output_trades_csv.is_some() {
                config.output_trades_csv = output_trades_csv;
            }
            if output_series_csv.is_some() {
                config.output_series_csv = output_series_csv;
            }

            if let Some(path) = save_config {
                config
                    .to_json_file(&path)
                    .with_context(|| format!("Failed to write config to {:?}", path))?;
                info!(path = %path.display(), "saved configuration");
            }

            run_backtest(&config)?;
        }
        Commands::Sweep {
            data,
            fast,
            slow,
            stop_loss,
            take_profit,
            smoothing,
            top,
            output_csv,
        } => {
            let config = base_configuration(&data)?;
            let grid = SweepGrid {
                fast_spans: fast,
                slow_spans: slow,
                stop_losses: stop_loss,
                take_profits: take_profit,
                smoothing,
            };
            run_sweep(&config, &grid, top, output_csv.as_deref())?;
        }
    }

    Ok(())
}

fn base_configuration(args: &DataArgs) -> Result<BacktestConfiguration> {
    let mut config = match &args.config {
        Some(path) => BacktestConfiguration::from_json_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => BacktestConfiguration::default(),
    };

    if let Some(market) = args.market {
        config.market = market;
    }
    if let Some(timeframe) = args.timeframe {
        config.timeframe = timeframe;
    }
    if args.data.is_some() {
        config.data_path = args.data.clone();
    }

    Ok(config)
}

fn load_bars(config: &BacktestConfiguration) -> Result<Vec<PriceBar>> {
    let source: Box<dyn DataSource> = match &config.data_path {
        Some(path) => Box::new(CsvSource::new(path)),
        None => Box::new(YahooSource::new()?),
    };
    let source = CachedSource::new(source);

    let ticker = config.market.ticker();
    info!(
        source = source.name(),
        ticker,
        interval = %config.timeframe,
        period = config.period(),
        "Loading data..."
    );

    let bars = source
        .fetch(ticker, config.timeframe, config.period())
        .context("Failed to load bars")?;

    if let Err(err) = pozole::data::check_ordering(&bars) {
        warn!(%err, "bars are not strictly increasing");
    }

    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        info!(bars = bars.len(), from = %first.timestamp, to = %last.timestamp, "loaded bars");
    }

    Ok(bars)
}

fn run_backtest(config: &BacktestConfiguration) -> Result<()> {
    let params = &config.strategy;
    params.validate()?;

    if params.fast_span >= params.slow_span {
        warn!(
            fast = params.fast_span,
            slow = params.slow_span,
            "fast span is not below slow span, signals are inverted"
        );
    }

    let bars = load_bars(config)?;
    let contract = config.market.contract();

    println!("{} {} ({})", config.market, config.timeframe, config.period());
    println!(
        "EMA {}/{} ({:?}), stop {} / target {} points\n",
        params.fast_span, params.slow_span, params.smoothing, params.stop_loss, params.take_profit
    );

    let result = simulate(&bars, params);
    let summary = SummaryMetrics::from_result(&result, Some(&contract));
    summary.pretty_print_table();

    if let Some(path) = &config.output_equity_csv {
        save_equity_csv(&result, path)?;
        println!("\nEquity curve saved to {:?}", path);
    }

    if let Some(path) = &config.output_trades_csv {
        save_trades_csv(&result, path)?;
        println!("Trades saved to {:?}", path);
    }

    if let Some(path) = &config.output_series_csv {
        save_series_csv(&bars, &result, path)?;
        println!("Price and EMA series saved to {:?}", path);
    }

    Ok(())
}

fn run_sweep(
    config: &BacktestConfiguration,
    grid: &SweepGrid,
    top: usize,
    output_csv: Option<&Path>,
) -> Result<()> {
    grid.validate()?;
    let bars = load_bars(config)?;
    let rows = sweep(&bars, grid)?;

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Fast"),
        Cell::new("Slow"),
        Cell::new("Stop"),
        Cell::new("Target"),
        Cell::new("Trades"),
        Cell::new("Win Rate"),
        Cell::new("Net PnL"),
        Cell::new("Max DD"),
    ]));

    for row in rows.iter().take(top) {
        table.add_row(Row::new(vec![
            Cell::new(&row.params.fast_span.to_string()),
            Cell::new(&row.params.slow_span.to_string()),
            Cell::new(&format!("{:.2}", row.params.stop_loss)),
            Cell::new(&format!("{:.2}", row.params.take_profit)),
            Cell::new(&row.summary.num_trades.to_string()),
            Cell::new(&format!("{:.1}%", row.summary.win_rate * 100.0)),
            Cell::new(&format!("{:.2}", row.summary.net_pnl)),
            Cell::new(&format!("{:.2}", row.summary.max_drawdown)),
        ]));
    }

    println!(
        "{} {}: {} combinations, top {}\n",
        config.market,
        config.timeframe,
        rows.len(),
        top.min(rows.len())
    );
    table.printstd();

    if let Some(path) = output_csv {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {:?}", path))?;
        writer.write_record([
            "fast_span",
            "slow_span",
            "stop_loss",
            "take_profit",
            "trades",
            "wins",
            "win_rate",
            "net_pnl",
            "max_drawdown",
        ])?;
        for row in &rows {
            writer.write_record([
                row.params.fast_span.to_string(),
                row.params.slow_span.to_string(),
                row.params.stop_loss.to_string(),
                row.params.take_profit.to_string(),
                row.summary.num_trades.to_string(),
                row.summary.num_winning_trades.to_string(),
                row.summary.win_rate.to_string(),
                row.summary.net_pnl.to_string(),
                row.summary.max_drawdown.to_string(),
            ])?;
        }
        writer.flush()?;
        println!("\nSweep results saved to {:?}", path);
    }

    Ok(())
}
