//! Data provider trait, fetch window types and structured error types.
//!
//! The DataProvider trait abstracts over price sources (Yahoo Finance, CSV
//! import, in-memory fixtures) so the scan and backtest orchestrators can be
//! driven by any of them and mocked in tests.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::Bar;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data error: {0}")]
    Other(String),
}

/// Malformed tabular input.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Lookback window for a fetch, e.g. `6mo` or `1y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    Months(u32),
    Years(u32),
    Max,
}

impl Period {
    /// Ranges the chart API accepts.
    pub const SUPPORTED: [Period; 8] = [
        Period::Months(1),
        Period::Months(3),
        Period::Months(6),
        Period::Years(1),
        Period::Years(2),
        Period::Years(5),
        Period::Years(10),
        Period::Max,
    ];

    fn supported_list() -> String {
        Period::SUPPORTED
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// First calendar date covered by this period when it ends on `end`.
    pub fn start_date(&self, end: NaiveDate) -> NaiveDate {
        let months = match self {
            Period::Months(m) => *m,
            Period::Years(y) => y.saturating_mul(12),
            Period::Max => return NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN),
        };
        end.checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN)
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::Months(6)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Months(m) => write!(f, "{m}mo"),
            Period::Years(y) => write!(f, "{y}y"),
            Period::Max => f.write_str("max"),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "max" {
            return Ok(Period::Max);
        }
        let period = if let Some(d) = s.strip_suffix("mo") {
            d.parse().ok().map(Period::Months)
        } else if let Some(d) = s.strip_suffix('y') {
            d.parse().ok().map(Period::Years)
        } else {
            None
        };
        period
            .filter(|p| Period::SUPPORTED.contains(p))
            .ok_or_else(|| format!("invalid period '{s}' (expected one of {})", Period::supported_list()))
    }
}

impl TryFrom<String> for Period {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        p.to_string()
    }
}

/// Bar interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interval {
    #[default]
    Daily,
    Weekly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1d" => Ok(Interval::Daily),
            "1wk" => Ok(Interval::Weekly),
            other => Err(format!("invalid interval '{other}' (expected 1d or 1wk)")),
        }
    }
}

impl TryFrom<String> for Interval {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(i: Interval) -> Self {
        i.as_str().to_string()
    }
}

/// Trait for price-history sources.
///
/// An empty `Vec` signals "no data available" and is not an error.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch bars for `symbol`, ascending by date, covering `period` up to today.
    fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<Bar>, DataError>;
}

/// In-memory provider serving fixed series. Unknown symbols yield no data.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    series: HashMap<String, Vec<Bar>>,
    failing: HashMap<String, String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        self.insert(symbol, bars);
        self
    }

    /// Make every fetch of `symbol` fail with `DataError::Other(reason)`.
    pub fn with_failure(mut self, symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        self.failing.insert(symbol.into(), reason.into());
        self
    }

    pub fn insert(&mut self, symbol: impl Into<String>, bars: Vec<Bar>) {
        self.series.insert(symbol.into(), bars);
    }
}

impl DataProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    /// Periods are ignored; the stored series is returned whole.
    fn fetch_series(
        &self,
        symbol: &str,
        _period: Period,
        _interval: Interval,
    ) -> Result<Vec<Bar>, DataError> {
        if let Some(reason) = self.failing.get(symbol) {
            return Err(DataError::Other(reason.clone()));
        }
        Ok(self.series.get(symbol).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_parsing() {
        assert_eq!("6mo".parse::<Period>(), Ok(Period::Months(6)));
        assert_eq!("1Y".parse::<Period>(), Ok(Period::Years(1)));
        assert_eq!("max".parse::<Period>(), Ok(Period::Max));
        assert!("0mo".parse::<Period>().is_err());
        assert!("6w".parse::<Period>().is_err());
        assert_eq!(Period::Years(2).to_string(), "2y");
    }

    #[test]
    fn period_accepts_only_chart_ranges() {
        for text in ["1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "max"] {
            let period: Period = text.parse().unwrap();
            assert_eq!(period.to_string(), text);
        }
        for text in ["7mo", "4y", "12mo", "3y", "100y"] {
            assert!(text.parse::<Period>().is_err(), "{text} should be rejected");
        }
    }

    #[test]
    fn period_start_date() {
        let end = NaiveDate::from_ymd_opt(2024, 8, 31).unwrap();
        assert_eq!(
            Period::Months(6).start_date(end),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            Period::Years(1).start_date(end),
            NaiveDate::from_ymd_opt(2023, 8, 31).unwrap()
        );
    }

    #[test]
    fn interval_parsing() {
        assert_eq!("1d".parse::<Interval>(), Ok(Interval::Daily));
        assert_eq!("1wk".parse::<Interval>(), Ok(Interval::Weekly));
        assert!("5m".parse::<Interval>().is_err());
    }

    #[test]
    fn period_serde_as_string() {
        let json = serde_json::to_string(&Period::Months(3)).unwrap();
        assert_eq!(json, "\"3mo\"");
        let back: Period = serde_json::from_str("\"2y\"").unwrap();
        assert_eq!(back, Period::Years(2));
    }

    #[test]
    fn memory_provider_unknown_symbol_is_empty() {
        let provider = MemoryProvider::new().with_failure("BAD", "boom");
        let bars = provider
            .fetch_series("NONE", Period::default(), Interval::Daily)
            .unwrap();
        assert!(bars.is_empty());
        assert!(provider
            .fetch_series("BAD", Period::default(), Interval::Daily)
            .is_err());
    }
}
