//! Backtest orchestrator — runs the simulator across a symbol list.
//!
//! Per symbol: fetch, optionally require a live setup on the latest bar,
//! simulate, and judge success on the last trade. Symbols run in parallel on a
//! bounded rayon pool; results are collected back in input order so the
//! concatenated trade log is deterministic.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use setupscan_core::data::{
    CandidateSource, DataError, DataProvider, Interval, Period, PriceFilter, UniverseError,
};
use setupscan_core::domain::Trade;
use setupscan_core::{classify, enrich, EnrichError, Setup};

use crate::config::{ConfigError, RunnerConfig};
use crate::metrics::{
    buy_and_hold_return_pct, last_trade_successful, round_to, summarize, BacktestSummary,
};
use crate::scan::{fetch_bars, log_skip, SkipReason, SymbolSkip};
use crate::simulator::{simulate, SimulationParams};
use crate::summary::SummaryError;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("universe error: {0}")]
    Universe(#[from] UniverseError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("invalid input: {0}")]
    InvalidInput(#[from] EnrichError),
    #[error("summary error: {0}")]
    Summary(#[from] SummaryError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("no data for symbol '{0}'")]
    NoData(String),
}

/// Report narrative when no symbol produced a trade.
pub const NO_SETUPS_NARRATIVE: &str = "No valid setups found during backtest.";

/// Rayon pool bounded by the configured concurrency.
pub(crate) fn build_pool(concurrency: usize) -> Result<rayon::ThreadPool, RunError> {
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.max(1))
        .build()?)
}

/// Backtest outcome for one symbol that reached the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolBacktest {
    pub symbol: String,
    /// Classification of the latest bar, when it is a setup.
    pub live_setup: Option<Setup>,
    pub bar_count: usize,
    pub trades: Vec<Trade>,
    pub summary: BacktestSummary,
    /// Last trade beat the minimum gain.
    pub successful: bool,
}

/// Aggregate result of a multi-symbol backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub period: Period,
    pub min_gain_fraction: f64,
    /// Symbols checked.
    pub total: usize,
    /// Symbols that passed the live-setup gate and were simulated.
    pub setups_found: usize,
    /// Simulated symbols whose last trade beat the minimum gain.
    pub successful: usize,
    /// `successful / setups_found` in percent, two decimals.
    pub success_rate: f64,
    /// Statistics over every trade, concatenated in input symbol order.
    pub summary: BacktestSummary,
    pub narrative: String,
    pub details: Vec<SymbolBacktest>,
    pub skipped: Vec<SymbolSkip>,
    pub benchmark_symbol: Option<String>,
    /// Buy-and-hold return of the benchmark over the same period, in percent.
    pub benchmark_return: Option<f64>,
}

impl BacktestReport {
    /// Every trade across all symbols, in input symbol order.
    pub fn trades(&self) -> impl Iterator<Item = &Trade> {
        self.details.iter().flat_map(|d| d.trades.iter())
    }
}

/// Run the backtest over `symbols`, or over the full candidate universe when
/// `symbols` is empty.
pub fn run_backtest(
    provider: &dyn DataProvider,
    candidates: &dyn CandidateSource,
    symbols: &[String],
    period: Period,
    min_gain_fraction: f64,
    config: &RunnerConfig,
) -> Result<BacktestReport, RunError> {
    config.validate()?;
    let symbols: Vec<String> = if symbols.is_empty() {
        candidates.list_candidates(PriceFilter::All, config.scan.price_threshold)?
    } else {
        normalize_symbols(symbols)
    };

    info!(
        provider = provider.name(),
        symbols = symbols.len(),
        period = %period,
        min_gain_fraction,
        "backtest started"
    );

    let pool = build_pool(config.concurrency)?;
    let outcomes: Vec<Result<SymbolBacktest, SkipReason>> = pool.install(|| {
        symbols
            .par_iter()
            .map(|symbol| backtest_symbol(provider, symbol, period, min_gain_fraction, config))
            .collect()
    });

    let mut details = Vec::new();
    let mut skipped = Vec::new();
    for (symbol, outcome) in symbols.iter().zip(outcomes) {
        match outcome {
            Ok(detail) => details.push(detail),
            Err(reason) => {
                log_skip(symbol, &reason);
                skipped.push(SymbolSkip {
                    symbol: symbol.clone(),
                    reason,
                });
            }
        }
    }

    let all_trades: Vec<Trade> = details.iter().flat_map(|d| d.trades.clone()).collect();
    let summary = summarize(&all_trades);
    let setups_found = details.len();
    let successful = details.iter().filter(|d| d.successful).count();
    let success_rate = if setups_found > 0 {
        round_to(successful as f64 / setups_found as f64 * 100.0, 2)
    } else {
        0.0
    };
    let narrative = if all_trades.is_empty() {
        NO_SETUPS_NARRATIVE.to_string()
    } else {
        summary.narrative.clone()
    };

    let benchmark_symbol = Some(config.backtest.benchmark_symbol.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_ascii_uppercase);
    let benchmark_return = benchmark_symbol
        .as_deref()
        .and_then(|s| benchmark_return(provider, s, period));

    info!(
        total = symbols.len(),
        setups_found,
        successful,
        trades = all_trades.len(),
        "backtest finished"
    );

    Ok(BacktestReport {
        period,
        min_gain_fraction,
        total: symbols.len(),
        setups_found,
        successful,
        success_rate,
        summary,
        narrative,
        details,
        skipped,
        benchmark_symbol,
        benchmark_return,
    })
}

/// Fetch, gate and simulate one symbol.
pub fn backtest_symbol(
    provider: &dyn DataProvider,
    symbol: &str,
    period: Period,
    min_gain_fraction: f64,
    config: &RunnerConfig,
) -> Result<SymbolBacktest, SkipReason> {
    let bars = fetch_bars(provider, symbol, period, Interval::Daily)?;
    let invalid = |e: EnrichError| SkipReason::InvalidInput {
        message: e.to_string(),
    };

    let live_setup = classify(&enrich(&bars).map_err(invalid)?);
    if config.backtest.require_live_setup && live_setup.is_none() {
        return Err(SkipReason::NoSetup);
    }

    let params = SimulationParams::from(&config.backtest);
    let trades = simulate(symbol, &bars, &params).map_err(invalid)?;
    let successful = last_trade_successful(&trades, min_gain_fraction, params.initial_balance);

    Ok(SymbolBacktest {
        symbol: symbol.to_string(),
        live_setup,
        bar_count: bars.len(),
        summary: summarize(&trades),
        trades,
        successful,
    })
}

/// Buy-and-hold percent return of `symbol`. `None` when unavailable.
fn benchmark_return(provider: &dyn DataProvider, symbol: &str, period: Period) -> Option<f64> {
    match provider.fetch_series(symbol, period, Interval::Daily) {
        Ok(bars) => {
            let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
            buy_and_hold_return_pct(&closes).map(|r| round_to(r, 2))
        }
        Err(e) => {
            warn!(symbol, error = %e, "benchmark unavailable");
            None
        }
    }
}

/// Trim, upper-case and drop blank symbols.
fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    symbols
        .iter()
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
