//! Natural-language summaries of a symbol's technical state.
//!
//! Text generation sits behind the [`SummaryGenerator`] trait and is passed
//! explicitly to whoever needs it. The trading bias is parsed from a
//! `Trading Bias: <word>` line in the generated text.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use setupscan_core::data::{DataProvider, Interval, Period};
use setupscan_core::setup::NO_SETUP_LABEL;
use setupscan_core::{classify, enrich, EnrichedSeries};

use crate::runner::RunError;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("not enough history to summarize {symbol}")]
    InsufficientData { symbol: String },

    #[error("summary generator failed: {0}")]
    Generator(String),
}

/// Directional call extracted from a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingBias {
    Bullish,
    Neutral,
    Bearish,
    Unknown,
}

impl TradingBias {
    /// Bullish 3, Neutral 2, Bearish 1, Unknown 0.
    pub fn score(&self) -> u8 {
        match self {
            TradingBias::Bullish => 3,
            TradingBias::Neutral => 2,
            TradingBias::Bearish => 1,
            TradingBias::Unknown => 0,
        }
    }

    /// Find the first `Trading Bias:` marker (any case, markdown emphasis
    /// allowed) and read the word after it.
    pub fn parse(text: &str) -> Self {
        const MARKER: &str = "trading bias:";
        let lower = text.to_lowercase();
        let Some(pos) = lower.find(MARKER) else {
            return TradingBias::Unknown;
        };
        let word: String = lower[pos + MARKER.len()..]
            .trim_start_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
            .chars()
            .take_while(|c| c.is_alphanumeric())
            .collect();

        if word.contains("bullish") {
            TradingBias::Bullish
        } else if word.contains("neutral") {
            TradingBias::Neutral
        } else if word.contains("bearish") {
            TradingBias::Bearish
        } else {
            TradingBias::Unknown
        }
    }
}

impl fmt::Display for TradingBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradingBias::Bullish => "Bullish",
            TradingBias::Neutral => "Neutral",
            TradingBias::Bearish => "Bearish",
            TradingBias::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub symbol: String,
    pub text: String,
    pub bias: TradingBias,
    pub bias_score: u8,
}

impl Summary {
    /// Clean generated text and parse its bias.
    pub fn from_text(symbol: &str, raw: &str) -> Self {
        let text = clean_text(raw);
        let bias = TradingBias::parse(&text);
        Self {
            symbol: symbol.to_string(),
            text,
            bias,
            bias_score: bias.score(),
        }
    }
}

/// Source of summary text for an enriched series.
pub trait SummaryGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Raw generated text.
    fn generate(&self, symbol: &str, series: &EnrichedSeries) -> Result<String, SummaryError>;

    fn summarize(&self, symbol: &str, series: &EnrichedSeries) -> Result<Summary, SummaryError> {
        let raw = self.generate(symbol, series)?;
        Ok(Summary::from_text(symbol, &raw))
    }
}

/// Drop any trade-setup section, placeholder prices and runs of blank lines.
pub fn clean_text(raw: &str) -> String {
    let mut text = raw.to_string();
    if let Some(pos) = text.find("Suggested Trade Setup") {
        let cut = text[..pos].rfind('\n').map_or(0, |i| i + 1);
        text.truncate(cut);
    }
    let text = text.replace("$X.XX", "");

    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for ch in text.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(ch);
    }
    out.trim().to_string()
}

/// Deterministic local generator built from the latest enriched bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateSummary;

impl SummaryGenerator for TemplateSummary {
    fn name(&self) -> &str {
        "template"
    }

    fn generate(&self, symbol: &str, series: &EnrichedSeries) -> Result<String, SummaryError> {
        let latest = series
            .latest()
            .ok_or_else(|| SummaryError::InsufficientData {
                symbol: symbol.to_string(),
            })?;
        let setup = classify(series);
        let close = latest.bar.close;

        let trend = match (close > latest.sma_20, close > latest.sma_50) {
            (true, true) => "Price is above both the 20-day and 50-day averages, an uptrend.",
            (false, true) => "Price dipped under the 20-day average but holds the 50-day trend.",
            (true, false) => "Price is above the 20-day average but still below the 50-day trend.",
            (false, false) => "Price is below both the 20-day and 50-day averages, a downtrend.",
        };
        let momentum = match latest.rsi {
            r if r > 70.0 => "overbought",
            r if r > 55.0 => "strong",
            r if r >= 45.0 => "neutral",
            r if r >= 30.0 => "weak",
            _ => "oversold",
        };
        let volume = if latest.flags.volume_spike {
            "Volume is spiking well above its 20-day average."
        } else {
            "Volume is in line with its 20-day average."
        };
        let bias = match (setup.is_some(), close > latest.sma_50) {
            (true, _) => TradingBias::Bullish,
            (false, true) => TradingBias::Neutral,
            (false, false) => TradingBias::Bearish,
        };

        Ok(format!(
            "**{symbol} Technical Breakdown**\n\n\
             **Trend**\n- {trend}\n- Close {close:.2}, SMA 20 {sma20:.2}, SMA 50 {sma50:.2}\n\n\
             **Momentum**\n- RSI {rsi:.1} ({momentum})\n- {volume}\n\n\
             **Setup**\n- {setup}\n\n\
             **Trading Bias:** {bias}\n",
            sma20 = latest.sma_20,
            sma50 = latest.sma_50,
            rsi = latest.rsi,
            setup = setup.map_or(NO_SETUP_LABEL, |s| s.label()),
        ))
    }
}

/// Fetch, enrich and summarize one symbol with the given generator.
pub fn summarize_symbol(
    provider: &dyn DataProvider,
    generator: &dyn SummaryGenerator,
    symbol: &str,
    period: Period,
) -> Result<Summary, RunError> {
    let bars = provider.fetch_series(symbol, period, Interval::Daily)?;
    if bars.is_empty() {
        return Err(RunError::NoData(symbol.to_string()));
    }
    let series = enrich(&bars)?;
    Ok(generator.summarize(symbol, &series)?)
}
