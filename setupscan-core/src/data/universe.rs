//! Candidate universe and the price filter.
//!
//! The universe is a TOML file listing symbols, optionally with a last known
//! price per symbol used to pre-filter candidates:
//!
//! ```toml
//! symbols = ["PLTR", "SOFI", "F"]
//!
//! [prices]
//! PLTR = 24.1
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Price boundary between the `Under` and `Over` filters.
pub const PRICE_THRESHOLD: f64 = 50.0;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("candidate source unavailable: {0}")]
    Unavailable(String),
}

/// Price filter applied to a symbol's latest close.
///
/// `Under` admits prices strictly below the threshold and `Over` admits
/// prices at or above it, so the two partition every price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceFilter {
    #[default]
    All,
    Under,
    Over,
}

impl PriceFilter {
    pub fn admits(&self, price: f64, threshold: f64) -> bool {
        match self {
            PriceFilter::All => true,
            PriceFilter::Under => price < threshold,
            PriceFilter::Over => price >= threshold,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceFilter::All => "all",
            PriceFilter::Under => "under",
            PriceFilter::Over => "over",
        }
    }
}

impl fmt::Display for PriceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['$', ' '], "_").as_str() {
            "all" => Ok(PriceFilter::All),
            "under" | "under_50" | "under__50" => Ok(PriceFilter::Under),
            "over" | "over_50" | "over__50" => Ok(PriceFilter::Over),
            other => Err(format!("invalid price filter '{other}' (expected all, under, over)")),
        }
    }
}

/// Source of candidate symbols for a scan.
pub trait CandidateSource: Send + Sync {
    /// Ordered candidate symbols. Symbols with a known price outside the
    /// filter at `threshold` may be dropped here; the orchestrator re-checks
    /// the latest close against the same threshold.
    fn list_candidates(
        &self,
        filter: PriceFilter,
        threshold: f64,
    ) -> Result<Vec<String>, UniverseError>;
}

/// A fixed list of symbols with optional last known prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticUniverse {
    pub symbols: Vec<String>,
    #[serde(default)]
    pub prices: BTreeMap<String, f64>,
}

impl StaticUniverse {
    pub fn new(symbols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut universe = Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            prices: BTreeMap::new(),
        };
        universe.normalize();
        universe
    }

    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        let mut universe: Self = toml::from_str(content)?;
        universe.normalize();
        Ok(universe)
    }

    /// Upper-case symbols and drop blanks and repeats, keeping first occurrence.
    fn normalize(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.symbols = self
            .symbols
            .iter()
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();
        self.prices = std::mem::take(&mut self.prices)
            .into_iter()
            .map(|(k, v)| (k.trim().to_ascii_uppercase(), v))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Built-in fallback list of liquid US small/mid caps.
    pub fn default_us() -> Self {
        Self::new([
            "PLTR", "SOFI", "U", "CHPT", "FUBO", "BBD", "MARA", "RIOT", "WBD", "RUN", "OPEN",
            "LUMN", "VZ", "T", "BB", "FCEL", "NOK", "SIRI", "PENN", "DNA", "SPWR", "WISH",
            "CVNA", "GPRO", "TLRY", "NKLA", "AUR", "RIVN", "HOOD", "F",
        ])
    }
}

impl CandidateSource for StaticUniverse {
    fn list_candidates(
        &self,
        filter: PriceFilter,
        threshold: f64,
    ) -> Result<Vec<String>, UniverseError> {
        Ok(self
            .symbols
            .iter()
            .filter(|s| {
                self.prices
                    .get(*s)
                    .map_or(true, |p| filter.admits(*p, threshold))
            })
            .cloned()
            .collect())
    }
}
