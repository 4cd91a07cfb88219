//! Setup classification on hand-shaped scenarios.

use setupscan_core::data::synthetic::{
    breakout_scenario, flat, momentum_scenario, rising, BREAKOUT_BAR,
};
use setupscan_core::setup::NO_SETUP_LABEL;
use setupscan_core::{classify, describe_setup, enrich, is_valid_setup, score, Setup};

#[test]
fn breakout_fires_on_bar_60_prefix_only() {
    let bars = breakout_scenario();

    let at = enrich(&bars[..=BREAKOUT_BAR]).unwrap();
    assert!(is_valid_setup(&at));
    assert_eq!(classify(&at), Some(Setup::Breakout));
    assert_eq!(describe_setup(&at), "Breakout setup");

    for end in 30..bars.len() {
        if end == BREAKOUT_BAR {
            continue;
        }
        let series = enrich(&bars[..=end]).unwrap();
        assert_eq!(classify(&series), None, "unexpected setup at bar {end}");
    }
}

#[test]
fn breakout_outranks_momentum() {
    // Rising series with a volume spike on the last bar: both flags set.
    let mut bars = rising(80);
    bars.last_mut().unwrap().volume = 10_000;
    let series = enrich(&bars).unwrap();
    let flags = series.latest().unwrap().flags;
    assert!(flags.breakout);
    assert!(flags.bullish_momentum);
    assert_eq!(classify(&series), Some(Setup::Breakout));
}

#[test]
fn momentum_scenario_scores_80() {
    let series = enrich(&momentum_scenario()).unwrap();
    let latest = series.latest().unwrap();
    assert!(!latest.flags.breakout);
    assert!(!latest.flags.pullback_bounce);
    assert_eq!(latest.rsi, 100.0);
    assert_eq!(classify(&series), Some(Setup::BullishMomentum));
    // 50 + 20 momentum - 5 overbought + 10 volume + 5 above SMA20
    assert_eq!(score(latest, classify(&series)), 80);
}

#[test]
fn flat_series_has_no_setup() {
    let series = enrich(&flat(80, 20.0)).unwrap();
    assert!(!series.is_empty());
    assert_eq!(classify(&series), None);
    assert_eq!(describe_setup(&series), NO_SETUP_LABEL);
}

#[test]
fn short_series_describes_no_setup() {
    let series = enrich(&rising(29)).unwrap();
    assert_eq!(describe_setup(&series), NO_SETUP_LABEL);
}
