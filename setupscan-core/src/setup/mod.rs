//! Setup classification and scoring.
//!
//! A setup is judged on the last bar of an enriched series only. Flags are
//! not mutually exclusive; classification takes the first match in the fixed
//! priority order Breakout > PullbackBounce > BullishMomentum.

pub mod flags;
pub mod score;

pub use flags::SetupFlags;
pub use score::score;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enrich::{EnrichedSeries, MIN_BARS};

/// A named entry pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Setup {
    Breakout,
    PullbackBounce,
    BullishMomentum,
}

impl Setup {
    /// Descriptive label, e.g. "Breakout setup".
    pub fn label(&self) -> &'static str {
        match self {
            Setup::Breakout => "Breakout setup",
            Setup::PullbackBounce => "Pullback & bounce setup",
            Setup::BullishMomentum => "Bullish momentum setup",
        }
    }

    /// Short title-cased name used in ranked scan output.
    pub fn title(&self) -> &'static str {
        match self {
            Setup::Breakout => "Breakout",
            Setup::PullbackBounce => "Pullback & Bounce",
            Setup::BullishMomentum => "Bullish Momentum",
        }
    }

    /// Additive score bonus for this classification.
    pub fn score_bonus(&self) -> i32 {
        match self {
            Setup::Breakout => 25,
            Setup::BullishMomentum => 20,
            Setup::PullbackBounce => 15,
        }
    }

    /// Classify a single flag set by priority.
    pub fn from_flags(flags: &SetupFlags) -> Option<Setup> {
        if flags.breakout {
            Some(Setup::Breakout)
        } else if flags.pullback_bounce {
            Some(Setup::PullbackBounce)
        } else if flags.bullish_momentum {
            Some(Setup::BullishMomentum)
        } else {
            None
        }
    }
}

impl fmt::Display for Setup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label returned when the latest bar carries no setup.
pub const NO_SETUP_LABEL: &str = "No clear setup";

/// Classification of the latest bar, or `None` when there is no valid setup.
///
/// Empty series and series computed from fewer than [`MIN_BARS`] raw bars
/// are never a setup.
pub fn classify(series: &EnrichedSeries) -> Option<Setup> {
    if series.source_len < MIN_BARS {
        return None;
    }
    series.latest().and_then(|row| Setup::from_flags(&row.flags))
}

/// True iff the latest bar is a Breakout, PullbackBounce or BullishMomentum setup.
pub fn is_valid_setup(series: &EnrichedSeries) -> bool {
    classify(series).is_some()
}

/// Label for the latest bar's classification. Safe on empty input.
pub fn describe_setup(series: &EnrichedSeries) -> &'static str {
    classify(series).map_or(NO_SETUP_LABEL, |s| s.label())
}
