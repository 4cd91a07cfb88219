//! Indicator Engine — turns raw bars into an enriched, fully-defined series.
//!
//! Every indicator column and previous-bar reference is computed on the whole
//! input, then rows where any derived value is undefined are dropped. Setup
//! flags are evaluated on the surviving rows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;
use crate::indicators::{AverageVolume, Indicator, RollingHigh, Rsi, Sma};
use crate::setup::SetupFlags;

/// Minimum raw bar count for technicals to be computed at all.
pub const MIN_BARS: usize = 30;

pub const SMA_FAST: usize = 20;
pub const SMA_SLOW: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const ROLLING_WINDOW: usize = 20;

/// Invalid input to the Indicator Engine. Fatal to the single computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnrichError {
    #[error("series is empty")]
    EmptySeries,

    #[error("bar {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },
}

/// One bar with every indicator and shifted reference defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedBar {
    /// Position of this bar in the raw input series.
    pub index: usize,
    pub bar: Bar,
    pub sma_20: f64,
    pub sma_50: f64,
    pub rsi: f64,
    pub rolling_high_20: f64,
    pub avg_volume_20: f64,
    pub prev_close: f64,
    pub prev_high: f64,
    pub prev_low: f64,
    pub prev_sma_20: f64,
    pub prev_rolling_high_20: f64,
    pub flags: SetupFlags,
}

/// Enriched series for one symbol. Possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedSeries {
    /// Raw bar count the series was computed from (before truncation).
    pub source_len: usize,
    pub rows: Vec<EnrichedBar>,
}

impl EnrichedSeries {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn latest(&self) -> Option<&EnrichedBar> {
        self.rows.last()
    }

    /// Row computed for raw bar `index`, if it survived truncation.
    pub fn row_at(&self, index: usize) -> Option<&EnrichedBar> {
        let first = self.rows.first()?.index;
        let row = self.rows.get(index.checked_sub(first)?)?;
        debug_assert_eq!(row.index, index);
        Some(row)
    }

    /// The row a prefix ending at raw bar `index` would report as its latest.
    ///
    /// Indicators never look ahead, so this equals `enrich(&bars[..=index])`'s
    /// last row whenever that prefix has at least [`MIN_BARS`] bars.
    pub fn latest_at(&self, index: usize) -> Option<&EnrichedBar> {
        let end = self.rows.partition_point(|row| row.index <= index);
        end.checked_sub(1).map(|i| &self.rows[i])
    }
}

/// Raw indicator columns aligned 1:1 with the input bars (NaN during warmup).
#[derive(Debug, Clone)]
pub struct IndicatorColumns {
    pub sma_20: Vec<f64>,
    pub sma_50: Vec<f64>,
    pub rsi: Vec<f64>,
    pub rolling_high_20: Vec<f64>,
    pub avg_volume_20: Vec<f64>,
}

impl IndicatorColumns {
    pub fn compute(bars: &[Bar]) -> Self {
        Self {
            sma_20: Sma::new(SMA_FAST).compute(bars),
            sma_50: Sma::new(SMA_SLOW).compute(bars),
            rsi: Rsi::new(RSI_PERIOD).compute(bars),
            rolling_high_20: RollingHigh::new(ROLLING_WINDOW).compute(bars),
            avg_volume_20: AverageVolume::new(ROLLING_WINDOW).compute(bars),
        }
    }
}

/// Check the input series is non-empty and every bar carries its OHLC fields.
pub fn validate(bars: &[Bar]) -> Result<(), EnrichError> {
    if bars.is_empty() {
        return Err(EnrichError::EmptySeries);
    }
    for (index, bar) in bars.iter().enumerate() {
        if let Some(field) = bar.missing_field() {
            return Err(EnrichError::MissingField { index, field });
        }
    }
    Ok(())
}

/// Compute the enriched series.
///
/// Fewer than [`MIN_BARS`] bars yields an empty series, not an error.
pub fn enrich(bars: &[Bar]) -> Result<EnrichedSeries, EnrichError> {
    validate(bars)?;
    if bars.len() < MIN_BARS {
        return Ok(EnrichedSeries {
            source_len: bars.len(),
            rows: Vec::new(),
        });
    }

    let cols = IndicatorColumns::compute(bars);
    let rows = (1..bars.len())
        .filter_map(|i| enriched_row(bars, &cols, i))
        .collect();

    Ok(EnrichedSeries {
        source_len: bars.len(),
        rows,
    })
}

fn enriched_row(bars: &[Bar], cols: &IndicatorColumns, i: usize) -> Option<EnrichedBar> {
    let defined = |v: f64| (!v.is_nan()).then_some(v);
    let prev = &bars[i - 1];

    let mut row = EnrichedBar {
        index: i,
        bar: bars[i].clone(),
        sma_20: defined(cols.sma_20[i])?,
        sma_50: defined(cols.sma_50[i])?,
        rsi: defined(cols.rsi[i])?,
        rolling_high_20: defined(cols.rolling_high_20[i])?,
        avg_volume_20: defined(cols.avg_volume_20[i])?,
        prev_close: prev.close,
        prev_high: prev.high,
        prev_low: prev.low,
        prev_sma_20: defined(cols.sma_20[i - 1])?,
        prev_rolling_high_20: defined(cols.rolling_high_20[i - 1])?,
        flags: SetupFlags::default(),
    };
    row.flags = SetupFlags::evaluate(&row);
    Some(row)
}
