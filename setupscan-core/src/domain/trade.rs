//! Trade — one fixed-horizon round trip produced by the backtest simulator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::setup::Setup;

/// A completed long trade: entry on a setup bar, exit a fixed number of bars later.
///
/// Immutable once created. `balance_after` is the running account balance
/// after this trade's P&L was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub setup: Setup,

    // ── Entry ──
    pub entry_bar: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_bar: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,

    // ── Size & PnL ──
    pub quantity: f64,
    pub pnl: f64,
    pub balance_before: f64,
    pub balance_after: f64,
}

impl Trade {
    /// Return on the trade as a fraction of entry cost.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 || self.quantity == 0.0 {
            return 0.0;
        }
        self.pnl / (self.entry_price * self.quantity)
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_bar - self.entry_bar
    }
}
