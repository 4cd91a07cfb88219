//! Scan Orchestrator — ranks the live setups across a candidate universe.
//!
//! Candidates are evaluated in chunks of `concurrency` symbols on a rayon
//! pool. Results are consumed in candidate order, so the `limit` cut-off and
//! the tie order of equal scores match a sequential scan exactly.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use setupscan_core::data::{CandidateSource, DataProvider, Interval, Period, PriceFilter};
use setupscan_core::domain::Bar;
use setupscan_core::rng::RngHierarchy;
use setupscan_core::{classify, enrich, score, Setup};

use crate::config::RunnerConfig;
use crate::metrics::round_to;
use crate::runner::{build_pool, RunError};

/// One ranked scan result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanHit {
    pub symbol: String,
    pub score: u8,
    pub setup: Setup,
    /// Title-cased setup name, e.g. "Pullback & Bounce".
    #[serde(rename = "type")]
    pub kind: String,
    /// Latest close, two decimals.
    pub price: f64,
    /// Latest RSI, one decimal.
    pub rsi: f64,
}

/// Why a symbol was dropped from a scan or backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The provider returned no bars.
    NoData,
    /// The provider failed for this symbol.
    FetchFailed { message: String },
    /// Latest close is outside the requested price filter.
    PriceFiltered { price: f64 },
    /// The bars could not be enriched.
    InvalidInput { message: String },
    /// The latest bar is not a valid setup.
    NoSetup,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "no data"),
            SkipReason::FetchFailed { message } => write!(f, "fetch failed: {message}"),
            SkipReason::PriceFiltered { price } => write!(f, "price {price:.2} outside filter"),
            SkipReason::InvalidInput { message } => write!(f, "invalid input: {message}"),
            SkipReason::NoSetup => write!(f, "no valid setup"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSkip {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Log a dropped symbol. Provider and input failures are warnings.
pub(crate) fn log_skip(symbol: &str, reason: &SkipReason) {
    match reason {
        SkipReason::FetchFailed { .. } | SkipReason::InvalidInput { .. } => {
            warn!(symbol, reason = %reason, "skipping symbol")
        }
        _ => debug!(symbol, reason = %reason, "skipping symbol"),
    }
}

/// Fetch a series, mapping failure and emptiness to skip reasons.
pub(crate) fn fetch_bars(
    provider: &dyn DataProvider,
    symbol: &str,
    period: Period,
    interval: Interval,
) -> Result<Vec<Bar>, SkipReason> {
    let bars = provider
        .fetch_series(symbol, period, interval)
        .map_err(|e| SkipReason::FetchFailed {
            message: e.to_string(),
        })?;
    if bars.is_empty() {
        return Err(SkipReason::NoData);
    }
    Ok(bars)
}

/// Ranked results plus every symbol that was checked and dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub filter: PriceFilter,
    pub hits: Vec<ScanHit>,
    pub skipped: Vec<SymbolSkip>,
    /// Number of candidates evaluated before the limit was reached.
    pub checked: usize,
}

/// List, shuffle and scan the candidate universe.
///
/// The shuffle is seeded from `config.seed` when set, so a fixed seed gives a
/// reproducible candidate order.
pub fn scan(
    provider: &dyn DataProvider,
    candidates: &dyn CandidateSource,
    filter: PriceFilter,
    limit: usize,
    config: &RunnerConfig,
) -> Result<ScanOutcome, RunError> {
    let mut symbols = candidates.list_candidates(filter, config.scan.price_threshold)?;
    let rng = config
        .seed
        .map_or_else(RngHierarchy::from_entropy, RngHierarchy::new);
    rng.shuffle(&format!("scan:{}", filter.as_str()), &mut symbols);
    debug!(seed = rng.master_seed(), candidates = symbols.len(), "shuffled candidates");

    scan_symbols(provider, &symbols, filter, limit, config)
}

/// Scan `symbols` in the given order.
pub fn scan_symbols(
    provider: &dyn DataProvider,
    symbols: &[String],
    filter: PriceFilter,
    limit: usize,
    config: &RunnerConfig,
) -> Result<ScanOutcome, RunError> {
    info!(
        provider = provider.name(),
        candidates = symbols.len(),
        filter = filter.as_str(),
        limit,
        "scan started"
    );

    let pool = build_pool(config.concurrency)?;
    let mut outcome = ScanOutcome {
        filter,
        ..ScanOutcome::default()
    };

    for chunk in symbols.chunks(config.concurrency.max(1)) {
        if outcome.hits.len() >= limit {
            break;
        }
        let results: Vec<Result<ScanHit, SkipReason>> = pool.install(|| {
            chunk
                .par_iter()
                .map(|symbol| evaluate_symbol(provider, symbol, filter, config))
                .collect()
        });

        for (symbol, result) in chunk.iter().zip(results) {
            if outcome.hits.len() >= limit {
                break;
            }
            outcome.checked += 1;
            match result {
                Ok(hit) => {
                    debug!(symbol = %hit.symbol, score = hit.score, setup = %hit.setup, "setup found");
                    outcome.hits.push(hit);
                }
                Err(reason) => {
                    log_skip(symbol, &reason);
                    outcome.skipped.push(SymbolSkip {
                        symbol: symbol.clone(),
                        reason,
                    });
                }
            }
        }
    }

    // Stable: equal scores keep encounter order.
    outcome.hits.sort_by(|a, b| b.score.cmp(&a.score));

    info!(
        hits = outcome.hits.len(),
        skipped = outcome.skipped.len(),
        checked = outcome.checked,
        "scan finished"
    );
    Ok(outcome)
}

/// Fetch, filter, enrich, classify and score one symbol.
pub fn evaluate_symbol(
    provider: &dyn DataProvider,
    symbol: &str,
    filter: PriceFilter,
    config: &RunnerConfig,
) -> Result<ScanHit, SkipReason> {
    let bars = fetch_bars(provider, symbol, config.scan.period, config.scan.interval)?;

    let price = bars.last().map_or(0.0, |b| b.close);
    if !filter.admits(price, config.scan.price_threshold) {
        return Err(SkipReason::PriceFiltered { price });
    }

    let series = enrich(&bars).map_err(|e| SkipReason::InvalidInput {
        message: e.to_string(),
    })?;
    let setup = classify(&series).ok_or(SkipReason::NoSetup)?;
    let latest = series.latest().ok_or(SkipReason::NoSetup)?;

    Ok(ScanHit {
        symbol: symbol.to_string(),
        score: score(latest, Some(setup)),
        setup,
        kind: setup.title().to_string(),
        price: round_to(price, 2),
        rsi: round_to(latest.rsi, 1),
    })
}
