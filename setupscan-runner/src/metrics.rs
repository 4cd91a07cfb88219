//! Backtest Aggregator — pure functions that reduce a trade log to statistics.
//!
//! Every metric is a pure function: trade list in, scalar out. Balances are
//! read from the trades themselves, so a log concatenated across symbols is
//! aggregated in the order given.

use serde::{Deserialize, Serialize};

use setupscan_core::domain::Trade;

/// Narrative for an empty trade log.
pub const NO_TRADES_NARRATIVE: &str = "No trades were triggered during this period.";

/// Aggregate statistics for a trade log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// Final balance minus the first trade's starting balance.
    pub total_return: f64,
    /// Sum of every trade's P&L.
    pub cumulative_return: f64,
    /// Percentage of trades with positive P&L, one decimal.
    pub win_rate: f64,
    /// Mean P&L per trade.
    pub avg_gain: f64,
    /// Largest drop of the balance below its running peak, as a positive amount.
    pub max_drawdown: f64,
    pub total_trades: usize,
    pub narrative: String,
}

impl BacktestSummary {
    pub fn empty() -> Self {
        Self {
            total_return: 0.0,
            cumulative_return: 0.0,
            win_rate: 0.0,
            avg_gain: 0.0,
            max_drawdown: 0.0,
            total_trades: 0,
            narrative: NO_TRADES_NARRATIVE.to_string(),
        }
    }
}

/// Reduce a trade log to a [`BacktestSummary`]. Money values round to cents.
pub fn summarize(trades: &[Trade]) -> BacktestSummary {
    if trades.is_empty() {
        return BacktestSummary::empty();
    }

    let total_return = total_return(trades);
    let win_rate = win_rate(trades);
    let avg_gain = avg_gain(trades);
    let max_drawdown = max_drawdown(trades);

    let narrative = format!(
        "In this period, the system grew your account by ${}.\n\
         {:.1}% of trades made money.\n\
         Average gain per trade: ${:.2}.\n\
         Worst dip in account: -${:.2}.\n",
        format_thousands(total_return),
        win_rate * 100.0,
        avg_gain,
        max_drawdown,
    );

    BacktestSummary {
        total_return: round_to(total_return, 2),
        cumulative_return: round_to(cumulative_return(trades), 2),
        win_rate: round_to(win_rate * 100.0, 1),
        avg_gain: round_to(avg_gain, 2),
        max_drawdown: round_to(max_drawdown, 2),
        total_trades: trades.len(),
        narrative,
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Last balance minus the balance the first trade started from.
pub fn total_return(trades: &[Trade]) -> f64 {
    match (trades.first(), trades.last()) {
        (Some(first), Some(last)) => last.balance_after - first.balance_before,
        _ => 0.0,
    }
}

pub fn cumulative_return(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.pnl).sum()
}

/// Win rate as a fraction in [0, 1].
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

pub fn avg_gain(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    cumulative_return(trades) / trades.len() as f64
}

/// Max over time of (running peak balance − balance), in currency units.
///
/// The balance series is each trade's `balance_after`. Returns 0.0 for
/// monotonically rising balances.
pub fn max_drawdown(trades: &[Trade]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for t in trades {
        peak = peak.max(t.balance_after);
        max_dd = max_dd.max(peak - t.balance_after);
    }
    max_dd
}

/// Whether a symbol's run counts as successful.
///
/// Only the last trade is checked: its P&L must exceed
/// `min_gain_fraction × initial_balance`. A profitable run whose final trade
/// lost money is not a success, and the reverse also holds.
pub fn last_trade_successful(trades: &[Trade], min_gain_fraction: f64, initial_balance: f64) -> bool {
    trades
        .last()
        .is_some_and(|t| t.pnl > min_gain_fraction * initial_balance)
}

/// Buy-and-hold return in percent from the first close to the last.
pub fn buy_and_hold_return_pct(closes: &[f64]) -> Option<f64> {
    let first = *closes.first()?;
    let last = *closes.last()?;
    if first <= 0.0 || closes.len() < 2 {
        return None;
    }
    Some((last - first) / first * 100.0)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `1234567.891` → `"1,234,567.89"`.
fn format_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}
