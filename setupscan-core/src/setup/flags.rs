//! Per-bar boolean signal flags.

use serde::{Deserialize, Serialize};

use crate::enrich::EnrichedBar;

/// Volume must exceed this multiple of the 20-bar average to count as a spike.
pub const VOLUME_SPIKE_MULTIPLE: f64 = 1.5;

/// RSI above this level counts as strength.
pub const RSI_STRENGTH_LEVEL: f64 = 55.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupFlags {
    /// Close above the previous bar's 20-bar high.
    pub breakout: bool,
    /// Above the 50-bar trend after a dip below the 20-bar average, recovering today.
    pub pullback_bounce: bool,
    pub volume_spike: bool,
    /// Green bar closing above the previous high.
    pub big_green: bool,
    pub rsi_strength: bool,
    pub above_sma_20: bool,
    /// All of volume_spike, big_green, rsi_strength and above_sma_20.
    pub bullish_momentum: bool,
}

impl SetupFlags {
    pub fn evaluate(row: &EnrichedBar) -> Self {
        let close = row.bar.close;

        let breakout = close > row.prev_rolling_high_20;
        let pullback_bounce =
            close > row.sma_50 && row.prev_low < row.prev_sma_20 && close > row.prev_close;
        let volume_spike = row.bar.volume as f64 > row.avg_volume_20 * VOLUME_SPIKE_MULTIPLE;
        let big_green = close > row.bar.open && close > row.prev_high;
        let rsi_strength = row.rsi > RSI_STRENGTH_LEVEL;
        let above_sma_20 = close > row.sma_20;

        Self {
            breakout,
            pullback_bounce,
            volume_spike,
            big_green,
            rsi_strength,
            above_sma_20,
            bullish_momentum: volume_spike && big_green && rsi_strength && above_sma_20,
        }
    }

    pub fn any_setup(&self) -> bool {
        self.breakout || self.pullback_bounce || self.bullish_momentum
    }
}
