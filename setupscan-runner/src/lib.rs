//! setupscan runner — scans, backtests, chart series, summaries and export.
//!
//! This crate builds on `setupscan-core` to provide:
//! - Scan Orchestrator: ranked live setups across a candidate universe
//! - Backtest Simulator with a fixed holding period
//! - Backtest Aggregator: return, win rate, drawdown, last-trade success
//! - Multi-symbol backtest orchestrator with a buy-and-hold benchmark
//! - Chart series and the summary generator seam
//! - TOML configuration and JSON/CSV/Markdown export

pub mod chart;
pub mod config;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod scan;
pub mod simulator;
pub mod summary;

pub use chart::{chart_from_bars, compute_chart_series, Candle, ChartSeries};
pub use config::{BacktestConfig, ConfigError, RunnerConfig, ScanConfig};
pub use export::{
    export_json, export_scan_csv, export_trades_csv, generate_report, save_backtest_artifacts,
    save_scan_artifacts,
};
pub use metrics::{last_trade_successful, summarize, BacktestSummary};
pub use runner::{run_backtest, BacktestReport, RunError, SymbolBacktest};
pub use scan::{scan, scan_symbols, ScanHit, ScanOutcome, SkipReason, SymbolSkip};
pub use simulator::{simulate, simulate_by_prefix, SimulationParams};
pub use summary::{
    summarize_symbol, Summary, SummaryError, SummaryGenerator, TemplateSummary, TradingBias,
};
