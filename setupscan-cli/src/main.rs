//! setupscan CLI — scan, backtest, chart and summary commands.
//!
//! Commands:
//! - `scan` — rank live setups across the candidate universe
//! - `backtest` — replay the setup strategy over history and report results
//! - `chart` — print candles with SMA 20/50 and RSI as JSON
//! - `summary` — print a plain-language technical summary for one symbol

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use setupscan_core::data::{
    CircuitBreaker, CsvProvider, DataProvider, Interval, Period, PriceFilter, StaticUniverse,
    SyntheticProvider, YahooProvider,
};
use setupscan_runner::{
    compute_chart_series, export_json, run_backtest, save_backtest_artifacts, save_scan_artifacts,
    scan, summarize_symbol, BacktestReport, RunnerConfig, ScanOutcome, TemplateSummary,
};

#[derive(Parser)]
#[command(
    name = "setupscan",
    version,
    about = "setupscan — equity setup screener and backtester"
)]
struct Cli {
    /// Path to a TOML config file. Defaults apply to anything it omits.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Price data source.
    #[arg(long, value_enum, default_value_t = Source::Yahoo, global = true)]
    source: Source,

    /// Directory of <SYMBOL>.csv files for `--source csv`.
    #[arg(long, default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Master seed for the candidate shuffle.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Worker-pool size for per-symbol work.
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Emit logs as JSON lines.
    #[arg(long, default_value_t = false, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Source {
    Yahoo,
    Csv,
    Synthetic,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank live setups across the candidate universe.
    Scan {
        /// Price filter: all, under, over.
        #[arg(long, default_value = "all")]
        filter: PriceFilter,

        /// Maximum number of results.
        #[arg(long)]
        limit: Option<usize>,

        /// Universe TOML file. Defaults to the built-in list.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Print the outcome as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Save scan.json and scan.csv under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Backtest the setup strategy over history.
    Backtest {
        /// Symbols to backtest. Defaults to the candidate universe.
        symbols: Vec<String>,

        /// Lookback period, e.g. 6mo, 1y, 2y.
        #[arg(long)]
        period: Option<Period>,

        /// Minimum last-trade gain in percent of the initial balance.
        #[arg(long)]
        min_gain: Option<f64>,

        /// Simulate every symbol, not only those with a setup today.
        #[arg(long, default_value_t = false)]
        all_symbols: bool,

        /// Universe TOML file used when no symbols are given.
        #[arg(long)]
        universe: Option<PathBuf>,

        /// Print the report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Save report.json, trades.csv and report.md under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print chart series (candles, SMA 20/50, RSI) as JSON.
    Chart {
        symbol: String,

        #[arg(long, default_value = "6mo")]
        period: Period,

        #[arg(long, default_value = "1d")]
        interval: Interval,
    },
    /// Print a technical summary with its trading bias.
    Summary {
        symbol: String,

        #[arg(long, default_value = "6mo")]
        period: Period,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = load_config(cli.config.as_deref(), cli.seed, cli.concurrency)?;
    let provider = build_provider(cli.source, &cli.data_dir, config.fetch_retries)?;
    info!(provider = provider.name(), "data source ready");

    match cli.command {
        Commands::Scan {
            filter,
            limit,
            universe,
            json,
            output_dir,
        } => run_scan_cmd(
            provider.as_ref(),
            &config,
            filter,
            limit,
            universe.as_deref(),
            json,
            output_dir.as_deref(),
        ),
        Commands::Backtest {
            symbols,
            period,
            min_gain,
            all_symbols,
            universe,
            json,
            output_dir,
        } => {
            let mut config = config;
            if all_symbols {
                config.backtest.require_live_setup = false;
            }
            run_backtest_cmd(
                provider.as_ref(),
                &config,
                &symbols,
                period,
                min_gain,
                universe.as_deref(),
                json,
                output_dir.as_deref(),
            )
        }
        Commands::Chart {
            symbol,
            period,
            interval,
        } => {
            let symbol = symbol.trim().to_ascii_uppercase();
            let chart = compute_chart_series(provider.as_ref(), &symbol, period, interval)?;
            println!("{}", export_json(&chart)?);
            Ok(())
        }
        Commands::Summary { symbol, period } => {
            let symbol = symbol.trim().to_ascii_uppercase();
            let summary = summarize_symbol(provider.as_ref(), &TemplateSummary, &symbol, period)?;
            println!("{}", summary.text);
            println!();
            println!("Bias score: {} ({})", summary.bias_score, summary.bias);
            Ok(())
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(
    path: Option<&Path>,
    seed: Option<u64>,
    concurrency: Option<usize>,
) -> Result<RunnerConfig> {
    let mut config = match path {
        Some(path) => RunnerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RunnerConfig::default(),
    };
    if seed.is_some() {
        config.seed = seed;
    }
    if let Some(n) = concurrency {
        config.concurrency = n;
    }
    config.validate()?;
    Ok(config)
}

fn build_provider(
    source: Source,
    data_dir: &Path,
    fetch_retries: u32,
) -> Result<Box<dyn DataProvider>> {
    Ok(match source {
        Source::Yahoo => {
            let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
            Box::new(YahooProvider::new(circuit_breaker)?.with_retries(fetch_retries))
        }
        Source::Csv => {
            if !data_dir.is_dir() {
                bail!("data directory not found: {}", data_dir.display());
            }
            Box::new(CsvProvider::new(data_dir))
        }
        Source::Synthetic => Box::new(SyntheticProvider::new()),
    })
}

fn load_universe(path: Option<&Path>) -> Result<StaticUniverse> {
    match path {
        Some(path) => StaticUniverse::from_file(path)
            .with_context(|| format!("failed to load universe {}", path.display())),
        None => Ok(StaticUniverse::default_us()),
    }
}

fn run_scan_cmd(
    provider: &dyn DataProvider,
    config: &RunnerConfig,
    filter: PriceFilter,
    limit: Option<usize>,
    universe: Option<&Path>,
    json: bool,
    output_dir: Option<&Path>,
) -> Result<()> {
    let universe = load_universe(universe)?;
    let limit = limit.unwrap_or(config.scan.limit);
    let outcome = scan(provider, &universe, filter, limit, config)?;

    if json {
        println!("{}", export_json(&outcome)?);
    } else {
        print_scan(&outcome);
    }

    if let Some(dir) = output_dir {
        let run_dir = save_scan_artifacts(&outcome, dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_backtest_cmd(
    provider: &dyn DataProvider,
    config: &RunnerConfig,
    symbols: &[String],
    period: Option<Period>,
    min_gain_pct: Option<f64>,
    universe: Option<&Path>,
    json: bool,
    output_dir: Option<&Path>,
) -> Result<()> {
    let universe = load_universe(universe)?;
    let period = period.unwrap_or(config.backtest.period);
    let min_gain_fraction = min_gain_pct.map_or(config.backtest.min_gain_fraction, |p| p / 100.0);

    let report = run_backtest(provider, &universe, symbols, period, min_gain_fraction, config)?;

    if json {
        println!("{}", export_json(&report)?);
    } else {
        print_backtest(&report);
    }

    if let Some(dir) = output_dir {
        let run_dir = save_backtest_artifacts(&report, dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn print_scan(outcome: &ScanOutcome) {
    println!();
    println!(
        "=== Scan ({}) — {} setups from {} checked ===",
        outcome.filter,
        outcome.hits.len(),
        outcome.checked
    );
    if outcome.hits.is_empty() {
        println!("No setups found.");
        return;
    }
    println!(
        "{:<4} {:<8} {:>5}  {:<18} {:>10} {:>6}",
        "#", "Symbol", "Score", "Type", "Price", "RSI"
    );
    for (i, hit) in outcome.hits.iter().enumerate() {
        println!(
            "{:<4} {:<8} {:>5}  {:<18} {:>10.2} {:>6.1}",
            i + 1,
            hit.symbol,
            hit.score,
            hit.kind,
            hit.price,
            hit.rsi
        );
    }
}

fn print_backtest(report: &BacktestReport) {
    println!();
    println!("=== Backtest ({}) ===", report.period);
    println!("Symbols:      {}", report.total);
    println!("Setups found: {}", report.setups_found);
    println!(
        "Successful:   {} ({:.2}%)",
        report.successful, report.success_rate
    );
    let s = &report.summary;
    println!("Trades:       {}", s.total_trades);
    println!("Total return: ${:.2}", s.total_return);
    println!("Cumulative:   ${:.2}", s.cumulative_return);
    println!("Win rate:     {:.1}%", s.win_rate);
    println!("Avg gain:     ${:.2}", s.avg_gain);
    println!("Max drawdown: -${:.2}", s.max_drawdown);
    if let (Some(symbol), Some(ret)) = (&report.benchmark_symbol, report.benchmark_return) {
        println!("{symbol} buy & hold: {ret:.2}%");
    }
    println!();
    print!("{}", report.narrative);
    if !report.narrative.ends_with('\n') {
        println!();
    }
}
