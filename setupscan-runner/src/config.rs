//! Serializable runner configuration.
//!
//! Every field has a default, so an empty TOML file (or no file at all) is a
//! valid configuration. CLI flags override individual fields after loading.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use setupscan_core::data::{Interval, Period, PRICE_THRESHOLD};

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration for scans and backtests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Worker-pool size for per-symbol fetch and compute.
    pub concurrency: usize,

    /// Master seed for the candidate shuffle. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Extra attempts for a failed remote fetch. Zero drops a failing
    /// symbol for the run after a single request.
    pub fetch_retries: u32,

    pub scan: ScanConfig,
    pub backtest: BacktestConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            seed: None,
            fetch_retries: 0,
            scan: ScanConfig::default(),
            backtest: BacktestConfig::default(),
        }
    }
}

impl RunnerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        if !(self.scan.price_threshold > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "scan.price_threshold must be positive, got {}",
                self.scan.price_threshold
            )));
        }
        self.backtest.validate()
    }
}

/// Scan Orchestrator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Boundary between the Under and Over price filters.
    pub price_threshold: f64,
    /// Maximum number of ranked results.
    pub limit: usize,
    pub period: Period,
    pub interval: Interval,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            price_threshold: PRICE_THRESHOLD,
            limit: 10,
            period: Period::Months(6),
            interval: Interval::Daily,
        }
    }
}

/// Backtest Simulator and orchestrator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub initial_balance: f64,
    /// Fraction of the running balance committed per trade.
    pub risk_fraction: f64,
    /// Fixed holding period in bars.
    pub holding_bars: usize,
    /// A symbol succeeds when its last trade earns more than this fraction
    /// of the initial balance.
    pub min_gain_fraction: f64,
    pub period: Period,
    /// Only simulate symbols whose latest bar is currently a setup.
    pub require_live_setup: bool,
    /// Buy-and-hold reference; empty disables the benchmark.
    pub benchmark_symbol: String,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            risk_fraction: 0.01,
            holding_bars: 5,
            min_gain_fraction: 0.05,
            period: Period::Years(1),
            require_live_setup: true,
            benchmark_symbol: "SPY".into(),
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_balance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "backtest.initial_balance must be positive, got {}",
                self.initial_balance
            )));
        }
        if !(self.risk_fraction > 0.0 && self.risk_fraction <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "backtest.risk_fraction must be in (0, 1], got {}",
                self.risk_fraction
            )));
        }
        if self.holding_bars == 0 {
            return Err(ConfigError::Invalid(
                "backtest.holding_bars must be at least 1".into(),
            ));
        }
        if !self.min_gain_fraction.is_finite() {
            return Err(ConfigError::Invalid(
                "backtest.min_gain_fraction must be finite".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = RunnerConfig::from_toml("").unwrap();
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.scan.price_threshold, 50.0);
        assert_eq!(config.scan.period, Period::Months(6));
        assert_eq!(config.backtest.holding_bars, 5);
        assert_eq!(config.backtest.period, Period::Years(1));
        assert_eq!(config.concurrency, 4);
        assert!(config.seed.is_none());
        assert_eq!(config.fetch_retries, 0);
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let toml = r#"
            concurrency = 8
            seed = 42
            fetch_retries = 2

            [scan]
            limit = 25
            period = "3mo"

            [backtest]
            min_gain_fraction = 0.02
            benchmark_symbol = "QQQ"
        "#;
        let config = RunnerConfig::from_toml(toml).unwrap();
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.fetch_retries, 2);
        assert_eq!(config.scan.limit, 25);
        assert_eq!(config.scan.period, Period::Months(3));
        assert_eq!(config.scan.interval, Interval::Daily);
        assert_eq!(config.backtest.min_gain_fraction, 0.02);
        assert_eq!(config.backtest.benchmark_symbol, "QQQ");
        assert_eq!(config.backtest.initial_balance, 10_000.0);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            RunnerConfig::from_toml("concurrency = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RunnerConfig::from_toml("[backtest]\nrisk_fraction = 1.5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RunnerConfig::from_toml("[scan]\nperiod = \"6w\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = RunnerConfig {
            seed: Some(7),
            ..RunnerConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(RunnerConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = RunnerConfig::from_file(Path::new("/nonexistent/setupscan.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
