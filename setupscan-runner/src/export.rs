//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: pretty serialization of scan outcomes and backtest reports
//! - **CSV**: trade tape and ranked scan results for external tools
//! - **Markdown**: human-readable backtest report

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use setupscan_core::domain::Trade;

use crate::runner::BacktestReport;
use crate::scan::{ScanHit, ScanOutcome};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a trade list as CSV.
///
/// Columns: symbol, setup, entry_bar, entry_date, entry_price, exit_bar,
/// exit_date, exit_price, quantity, pnl, return_pct, balance_before,
/// balance_after
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "symbol",
        "setup",
        "entry_bar",
        "entry_date",
        "entry_price",
        "exit_bar",
        "exit_date",
        "exit_price",
        "quantity",
        "pnl",
        "return_pct",
        "balance_before",
        "balance_after",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.symbol,
            t.setup.title(),
            &t.entry_bar.to_string(),
            &t.entry_date.to_string(),
            &format!("{:.6}", t.entry_price),
            &t.exit_bar.to_string(),
            &t.exit_date.to_string(),
            &format!("{:.6}", t.exit_price),
            &format!("{:.6}", t.quantity),
            &format!("{:.2}", t.pnl),
            &format!("{:.4}", t.return_pct() * 100.0),
            &format!("{:.2}", t.balance_before),
            &format!("{:.2}", t.balance_after),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export ranked scan hits as CSV with rank, symbol, score, type, price, rsi.
pub fn export_scan_csv(hits: &[ScanHit]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["rank", "symbol", "score", "type", "price", "rsi"])?;
    for (i, hit) in hits.iter().enumerate() {
        wtr.write_record([
            &(i + 1).to_string(),
            &hit.symbol,
            &hit.score.to_string(),
            &hit.kind,
            &format!("{:.2}", hit.price),
            &format!("{:.1}", hit.rsi),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundles ───────────────────────────────────────────────

fn create_run_dir(output_dir: &Path, prefix: &str) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        prefix,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;
    Ok(run_dir)
}

/// Save a backtest report as `backtest_{timestamp}/` under `output_dir`:
/// - `report.json` — the full `BacktestReport`
/// - `trades.csv` — every trade in input symbol order
/// - `report.md` — Markdown summary
pub fn save_backtest_artifacts(report: &BacktestReport, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = create_run_dir(output_dir, "backtest")?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)?;

    let trades: Vec<Trade> = report.trades().cloned().collect();
    std::fs::write(run_dir.join("trades.csv"), export_trades_csv(&trades)?)?;

    std::fs::write(run_dir.join("report.md"), generate_report(report))?;

    Ok(run_dir)
}

/// Save a scan outcome as `scan_{timestamp}/` with `scan.json` and `scan.csv`.
pub fn save_scan_artifacts(outcome: &ScanOutcome, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = create_run_dir(output_dir, "scan")?;
    std::fs::write(run_dir.join("scan.json"), export_json(outcome)?)?;
    std::fs::write(run_dir.join("scan.csv"), export_scan_csv(&outcome.hits)?)?;
    Ok(run_dir)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report for a backtest run.
pub fn generate_report(report: &BacktestReport) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Backtest Report\n\n");

    md.push_str("## Overview\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Period | {} |\n", report.period));
    md.push_str(&format!("| Symbols Checked | {} |\n", report.total));
    md.push_str(&format!("| Setups Found | {} |\n", report.setups_found));
    md.push_str(&format!(
        "| Successful | {} ({:.2}%) |\n",
        report.successful, report.success_rate
    ));
    md.push_str(&format!(
        "| Min Gain | {:.1}% |\n",
        report.min_gain_fraction * 100.0
    ));
    if let (Some(symbol), Some(ret)) = (&report.benchmark_symbol, report.benchmark_return) {
        md.push_str(&format!("| {symbol} Buy & Hold | {ret:.2}% |\n"));
    }
    md.push('\n');

    let s = &report.summary;
    md.push_str("## Performance\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Total Return | ${:.2} |\n", s.total_return));
    md.push_str(&format!("| Cumulative P&L | ${:.2} |\n", s.cumulative_return));
    md.push_str(&format!("| Win Rate | {:.1}% |\n", s.win_rate));
    md.push_str(&format!("| Avg Gain | ${:.2} |\n", s.avg_gain));
    md.push_str(&format!("| Max Drawdown | -${:.2} |\n", s.max_drawdown));
    md.push_str(&format!("| Trades | {} |\n", s.total_trades));
    md.push('\n');

    md.push_str("## Summary\n\n");
    md.push_str(report.narrative.trim_end());
    md.push_str("\n\n");

    if !report.details.is_empty() {
        md.push_str("## Symbols\n\n");
        md.push_str("| Symbol | Live Setup | Trades | Win Rate | Last Trade P&L | Success |\n");
        md.push_str("| --- | --- | --- | --- | --- | --- |\n");
        for d in &report.details {
            let live = d.live_setup.map_or("-", |s| s.title());
            let last = d
                .trades
                .last()
                .map_or_else(|| "-".to_string(), |t| format!("${:.2}", t.pnl));
            md.push_str(&format!(
                "| {} | {} | {} | {:.1}% | {} | {} |\n",
                d.symbol,
                live,
                d.trades.len(),
                d.summary.win_rate,
                last,
                if d.successful { "yes" } else { "no" }
            ));
        }
        md.push('\n');
    }

    if !report.skipped.is_empty() {
        md.push_str("## Skipped\n\n");
        for skip in &report.skipped {
            md.push_str(&format!("- {}: {}\n", skip.symbol, skip.reason));
        }
    }

    md
}
