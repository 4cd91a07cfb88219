//! BDD tests for the Scan Orchestrator.
//!
//! These tests verify:
//! - Symbols with no data or no setup are skipped, not fatal
//! - Provider failures skip the symbol and the scan continues
//! - Price filters partition candidates at the threshold
//! - Results are ranked by score
//! - A failing symbol is fetched once and dropped for the run

use std::collections::HashMap;
use std::sync::Mutex;

use setupscan_core::data::synthetic::{flat, momentum_scenario};
use setupscan_core::data::{
    DataError, DataProvider, Interval, MemoryProvider, Period, PriceFilter, StaticUniverse,
};
use setupscan_core::domain::Bar;
use setupscan_runner::{scan, scan_symbols, RunnerConfig, SkipReason, SymbolSkip};

fn config() -> RunnerConfig {
    RunnerConfig {
        concurrency: 3,
        seed: Some(42),
        ..RunnerConfig::default()
    }
}

fn symbols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn bdd_scenario_only_the_valid_setup_is_returned() {
    // GIVEN three candidates: A has no data, B has no setup, C scores 80
    let provider = MemoryProvider::new()
        .with_series("B", flat(80, 20.0))
        .with_series("C", momentum_scenario());

    // WHEN the scan runs over them in order
    let outcome = scan_symbols(
        &provider,
        &symbols(&["A", "B", "C"]),
        PriceFilter::All,
        10,
        &config(),
    )
    .unwrap();

    // THEN only C is returned, with score 80
    assert_eq!(outcome.hits.len(), 1);
    let hit = &outcome.hits[0];
    assert_eq!(hit.symbol, "C");
    assert_eq!(hit.score, 80);
    assert_eq!(hit.kind, "Bullish Momentum");

    // AND A and B are recorded as skips
    assert_eq!(
        outcome.skipped,
        [
            SymbolSkip {
                symbol: "A".into(),
                reason: SkipReason::NoData
            },
            SymbolSkip {
                symbol: "B".into(),
                reason: SkipReason::NoSetup
            },
        ]
    );
    assert_eq!(outcome.checked, 3);
}

#[test]
fn bdd_scenario_fetch_failure_does_not_abort_scan() {
    // GIVEN a provider that fails for one symbol
    let provider = MemoryProvider::new()
        .with_failure("BAD", "connection reset")
        .with_series("GOOD", momentum_scenario());

    // WHEN the scan runs
    let outcome = scan_symbols(
        &provider,
        &symbols(&["BAD", "GOOD"]),
        PriceFilter::All,
        10,
        &config(),
    )
    .unwrap();

    // THEN the failing symbol is skipped and the rest still scanned
    assert_eq!(outcome.hits.len(), 1);
    assert_eq!(outcome.hits[0].symbol, "GOOD");
    assert!(matches!(
        outcome.skipped[0].reason,
        SkipReason::FetchFailed { .. }
    ));
}

#[test]
fn bdd_scenario_price_filter_partitions_at_threshold() {
    // GIVEN a symbol whose latest close is 139.50
    let provider = MemoryProvider::new().with_series("MOM", momentum_scenario());
    let syms = symbols(&["MOM"]);

    // WHEN scanned under each filter
    let under = scan_symbols(&provider, &syms, PriceFilter::Under, 10, &config()).unwrap();
    let over = scan_symbols(&provider, &syms, PriceFilter::Over, 10, &config()).unwrap();
    let all = scan_symbols(&provider, &syms, PriceFilter::All, 10, &config()).unwrap();

    // THEN it is admitted by Over and All but not Under
    assert!(under.hits.is_empty());
    assert_eq!(
        under.skipped[0].reason,
        SkipReason::PriceFiltered { price: 139.5 }
    );
    assert_eq!(over.hits.len(), 1);
    assert_eq!(all.hits.len(), 1);
}

#[test]
fn bdd_scenario_threshold_is_configurable() {
    // GIVEN a threshold raised above the latest close
    let mut config = config();
    config.scan.price_threshold = 200.0;
    let provider = MemoryProvider::new().with_series("MOM", momentum_scenario());

    // WHEN scanned for cheap symbols
    let outcome =
        scan_symbols(&provider, &symbols(&["MOM"]), PriceFilter::Under, 10, &config).unwrap();

    // THEN 139.50 now counts as under
    assert_eq!(outcome.hits.len(), 1);
}

#[test]
fn bdd_scenario_universe_scan_honours_limit() {
    // GIVEN a universe of ten symbols that all carry a setup
    let names: Vec<String> = (0..10).map(|i| format!("S{i}")).collect();
    let universe = StaticUniverse::new(names.clone());
    let mut provider = MemoryProvider::new();
    for name in &names {
        provider.insert(name.clone(), momentum_scenario());
    }

    // WHEN scanning with a limit of four
    let outcome = scan(&provider, &universe, PriceFilter::All, 4, &config()).unwrap();

    // THEN exactly four results come back and no more candidates were checked
    assert_eq!(outcome.hits.len(), 4);
    assert_eq!(outcome.checked, 4);
    assert!(outcome.hits.iter().all(|h| h.score == 80));
}

#[test]
fn bdd_scenario_universe_prefilter_uses_configured_threshold() {
    // GIVEN a universe whose price table lists MOM at 139.50
    let universe = StaticUniverse::from_toml("symbols = [\"MOM\"]\n[prices]\nMOM = 139.5\n").unwrap();
    let provider = MemoryProvider::new().with_series("MOM", momentum_scenario());

    // AND a threshold raised to 200
    let mut config = config();
    config.scan.price_threshold = 200.0;

    // WHEN scanning the universe for cheap symbols
    let outcome = scan(&provider, &universe, PriceFilter::Under, 10, &config).unwrap();

    // THEN the universe keeps MOM and the scan admits it
    assert_eq!(outcome.checked, 1);
    assert_eq!(outcome.hits.len(), 1);
    assert_eq!(outcome.hits[0].symbol, "MOM");

    // AND scanning for expensive symbols drops it at the universe
    let over = scan(&provider, &universe, PriceFilter::Over, 10, &config).unwrap();
    assert_eq!(over.checked, 0);
}

/// Wraps a provider and counts fetches per symbol.
struct CountingProvider {
    inner: MemoryProvider,
    calls: Mutex<HashMap<String, usize>>,
}

impl CountingProvider {
    fn new(inner: MemoryProvider) -> Self {
        Self {
            inner,
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn calls(&self, symbol: &str) -> usize {
        self.calls.lock().unwrap().get(symbol).copied().unwrap_or(0)
    }
}

impl DataProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<Bar>, DataError> {
        *self.calls.lock().unwrap().entry(symbol.to_string()).or_default() += 1;
        self.inner.fetch_series(symbol, period, interval)
    }
}

#[test]
fn bdd_scenario_failing_symbol_is_fetched_once() {
    // GIVEN a provider that fails for BAD
    let provider = CountingProvider::new(
        MemoryProvider::new()
            .with_failure("BAD", "HTTP 500")
            .with_series("GOOD", momentum_scenario()),
    );

    // WHEN the scan runs
    let outcome = scan_symbols(
        &provider,
        &symbols(&["BAD", "GOOD"]),
        PriceFilter::All,
        10,
        &config(),
    )
    .unwrap();

    // THEN BAD was requested exactly once and then dropped
    assert_eq!(provider.calls("BAD"), 1);
    assert_eq!(provider.calls("GOOD"), 1);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].symbol, "BAD");
}
