//! Backtest Simulator — replays a series bar by bar with a fixed holding period.
//!
//! At every bar `i` that leaves `holding_bars` bars after it, the classifier is
//! asked whether the prefix `bars[..=i]` ends in a valid setup. If so, a long
//! position sized at `balance × risk_fraction / close[i]` is opened at
//! `close[i]` and closed at `close[i + holding_bars]`. No stops, no early exit.
//!
//! Two entry points produce identical trade logs:
//! - `simulate()`: enriches the full series once and reads each prefix's
//!   latest row from it. Valid because no indicator looks ahead.
//! - `simulate_by_prefix()`: re-enriches every prefix window. Reference path.

use serde::{Deserialize, Serialize};
use tracing::debug;

use setupscan_core::domain::{Bar, Trade};
use setupscan_core::{classify, enrich, EnrichError, Setup, MIN_BARS};

use crate::config::BacktestConfig;

/// Series shorter than this produce no trades.
pub const MIN_SIMULATION_BARS: usize = 50;

/// Sizing and holding parameters for one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub initial_balance: f64,
    pub risk_fraction: f64,
    pub holding_bars: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            risk_fraction: 0.01,
            holding_bars: 5,
        }
    }
}

impl From<&BacktestConfig> for SimulationParams {
    fn from(config: &BacktestConfig) -> Self {
        Self {
            initial_balance: config.initial_balance,
            risk_fraction: config.risk_fraction,
            holding_bars: config.holding_bars,
        }
    }
}

/// Simulate with a single enrichment of the full series.
pub fn simulate(
    symbol: &str,
    bars: &[Bar],
    params: &SimulationParams,
) -> Result<Vec<Trade>, EnrichError> {
    if too_short(bars, params) {
        return Ok(Vec::new());
    }
    let series = enrich(bars)?;
    replay(symbol, bars, params, |i| {
        if i + 1 < MIN_BARS {
            return Ok(None);
        }
        Ok(series
            .latest_at(i)
            .and_then(|row| Setup::from_flags(&row.flags)))
    })
}

/// Simulate by recomputing the Indicator Engine on every prefix window.
pub fn simulate_by_prefix(
    symbol: &str,
    bars: &[Bar],
    params: &SimulationParams,
) -> Result<Vec<Trade>, EnrichError> {
    if too_short(bars, params) {
        return Ok(Vec::new());
    }
    replay(symbol, bars, params, |i| {
        let window = enrich(&bars[..=i])?;
        Ok(classify(&window))
    })
}

fn too_short(bars: &[Bar], params: &SimulationParams) -> bool {
    bars.len() < MIN_SIMULATION_BARS || bars.len() <= params.holding_bars
}

/// Walk the eligible entry bars, asking `setup_at(i)` for the prefix ending at `i`.
fn replay<F>(
    symbol: &str,
    bars: &[Bar],
    params: &SimulationParams,
    mut setup_at: F,
) -> Result<Vec<Trade>, EnrichError>
where
    F: FnMut(usize) -> Result<Option<Setup>, EnrichError>,
{
    let mut balance = params.initial_balance;
    let mut trades = Vec::new();

    for i in 0..bars.len() - params.holding_bars {
        let Some(setup) = setup_at(i)? else {
            continue;
        };

        let exit_bar = i + params.holding_bars;
        let entry = &bars[i];
        let exit = &bars[exit_bar];
        if entry.close <= 0.0 {
            debug!(symbol, bar = i, close = entry.close, "skipping entry at non-positive price");
            continue;
        }

        let quantity = balance * params.risk_fraction / entry.close;
        let pnl = (exit.close - entry.close) * quantity;
        let balance_before = balance;
        balance += pnl;

        trades.push(Trade {
            symbol: symbol.to_string(),
            setup,
            entry_bar: i,
            entry_date: entry.date,
            entry_price: entry.close,
            exit_bar,
            exit_date: exit.date,
            exit_price: exit.close,
            quantity,
            pnl,
            balance_before,
            balance_after: balance,
        });
    }

    debug!(symbol, bars = bars.len(), trades = trades.len(), "simulation complete");
    Ok(trades)
}
