//! Property tests for the Backtest Simulator.
//!
//! Uses proptest to verify:
//! 1. Rising prices: every long trade on a rising series has non-negative P&L
//! 2. Equivalence: the incremental path matches per-prefix recomputation
//! 3. Balance chain: each trade starts from the previous trade's balance

use chrono::NaiveDate;
use proptest::prelude::*;
use setupscan_core::data::synthetic::{random_walk, rising};
use setupscan_runner::{simulate, simulate_by_prefix, SimulationParams};

// ── 1. Rising prices ─────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn rising_series_never_loses(len in 50usize..160, holding in 1usize..10) {
        let params = SimulationParams { holding_bars: holding, ..SimulationParams::default() };
        let bars = rising(len);
        let trades = simulate("UP", &bars, &params).unwrap();
        prop_assert_eq!(trades.len(), (len - holding).saturating_sub(49));
        for t in &trades {
            prop_assert!(t.pnl >= 0.0);
        }
    }
}

// ── 2. Equivalence ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn incremental_matches_prefix(symbol in "[A-Z]{1,5}", months in 3u32..12) {
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let start = end.checked_sub_months(chrono::Months::new(months)).unwrap();
        let bars = random_walk(&symbol, start, end);
        let params = SimulationParams::default();
        prop_assert_eq!(
            simulate(&symbol, &bars, &params).unwrap(),
            simulate_by_prefix(&symbol, &bars, &params).unwrap()
        );
    }
}

// ── 3. Balance chain ─────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn balances_chain(symbol in "[A-Z]{1,5}", risk in 0.001f64..0.2) {
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let bars = random_walk(&symbol, start, end);
        let params = SimulationParams { risk_fraction: risk, ..SimulationParams::default() };
        let trades = simulate(&symbol, &bars, &params).unwrap();
        let mut balance = params.initial_balance;
        for t in &trades {
            prop_assert_eq!(t.balance_before, balance);
            prop_assert!((t.balance_after - (t.balance_before + t.pnl)).abs() < 1e-9);
            prop_assert_eq!(t.exit_bar - t.entry_bar, params.holding_bars);
            balance = t.balance_after;
        }
    }
}
