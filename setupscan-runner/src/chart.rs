//! Chart series: candles plus SMA 20, SMA 50 and RSI aligned by date.
//!
//! Unlike the enriched series, nothing is truncated. Every fetched bar gets a
//! candle, and indicator values that are still warming up are `None`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use setupscan_core::data::{DataProvider, Interval, Period};
use setupscan_core::domain::Bar;
use setupscan_core::enrich::{validate, IndicatorColumns};
use setupscan_core::{EnrichError, MIN_BARS};

use crate::metrics::round_to;
use crate::runner::RunError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub candles: Vec<Candle>,
    pub sma_20: Vec<Option<f64>>,
    pub sma_50: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Build chart columns from raw bars. Fewer than 30 bars gives an empty chart.
///
/// Prices and averages are rounded to two decimals, RSI to one.
pub fn chart_from_bars(symbol: &str, bars: &[Bar]) -> Result<ChartSeries, EnrichError> {
    validate(bars)?;
    let mut chart = ChartSeries {
        symbol: symbol.to_string(),
        ..ChartSeries::default()
    };
    if bars.len() < MIN_BARS {
        return Ok(chart);
    }

    let cols = IndicatorColumns::compute(bars);
    let defined = |v: f64, decimals: i32| (!v.is_nan()).then(|| round_to(v, decimals));

    for (i, bar) in bars.iter().enumerate() {
        chart.dates.push(bar.date);
        chart.candles.push(Candle {
            open: round_to(bar.open, 2),
            high: round_to(bar.high, 2),
            low: round_to(bar.low, 2),
            close: round_to(bar.close, 2),
            volume: bar.volume,
        });
        chart.sma_20.push(defined(cols.sma_20[i], 2));
        chart.sma_50.push(defined(cols.sma_50[i], 2));
        chart.rsi.push(defined(cols.rsi[i], 1));
    }
    Ok(chart)
}

/// Fetch `symbol` and build its chart series.
pub fn compute_chart_series(
    provider: &dyn DataProvider,
    symbol: &str,
    period: Period,
    interval: Interval,
) -> Result<ChartSeries, RunError> {
    let bars = provider.fetch_series(symbol, period, interval)?;
    if bars.is_empty() {
        return Err(RunError::NoData(symbol.to_string()));
    }
    Ok(chart_from_bars(symbol, &bars)?)
}
