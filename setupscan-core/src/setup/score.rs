//! Setup Scorer — bounded attractiveness score for a classified bar.

use super::Setup;
use crate::enrich::EnrichedBar;

const BASE_SCORE: i32 = 50;

/// Score a bar in [0, 100].
///
/// Missing values degrade to neutral: a NaN RSI adds nothing, and an
/// unclassified bar gets no setup bonus.
pub fn score(latest: &EnrichedBar, setup: Option<Setup>) -> u8 {
    let mut total = BASE_SCORE;

    total += setup.map_or(0, |s| s.score_bonus());
    total += rsi_adjustment(latest.rsi);
    if latest.flags.volume_spike {
        total += 10;
    }
    if latest.flags.above_sma_20 {
        total += 5;
    }

    total.clamp(0, 100) as u8
}

fn rsi_adjustment(rsi: f64) -> i32 {
    if rsi.is_nan() {
        0
    } else if (50.0..=70.0).contains(&rsi) {
        15
    } else if rsi > 70.0 {
        -5
    } else if rsi < 30.0 {
        -10
    } else {
        0
    }
}
