//! Look-ahead contamination tests for the Indicator Engine.
//!
//! No indicator value or setup flag at bar t may depend on bar t+1 or later.
//!
//! Method: compute on a truncated series and on the full series, then assert
//! every row the truncated run produced is identical in the full run.

use chrono::NaiveDate;
use setupscan_core::domain::Bar;
use setupscan_core::indicators::{AverageVolume, Indicator, RollingHigh, Rsi, Sma};
use setupscan_core::{classify, enrich};

/// Deterministic LCG walk with varying volume.
fn make_test_bars(n: usize) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0;

    for i in 0..n {
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
        let change = ((seed % 200) as f64 - 100.0) * 0.05;
        price = (price + change).max(10.0);

        let open = price - 0.5;
        let close = price + 0.3;
        bars.push(Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high: open.max(close) + 2.0,
            low: open.min(close) - 2.0,
            close,
            volume: 1000 + (seed % 3000),
        });
    }

    bars
}

fn assert_no_lookahead(indicator: &dyn Indicator, full_bars: &[Bar], truncated_len: usize) {
    let full = indicator.compute(full_bars);
    let truncated = indicator.compute(&full_bars[..truncated_len]);
    assert_eq!(truncated.len(), truncated_len, "{}", indicator.name());

    for (i, (t, f)) in truncated.iter().zip(&full).enumerate() {
        if t.is_nan() {
            assert!(f.is_nan(), "{}: bar {i} defined only with future data", indicator.name());
        } else {
            assert_eq!(t, f, "{}: bar {i} changed when future bars were added", indicator.name());
        }
    }
}

#[test]
fn indicators_are_causal() {
    let bars = make_test_bars(200);
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Sma::new(20)),
        Box::new(Sma::new(50)),
        Box::new(Rsi::new(14)),
        Box::new(RollingHigh::new(20)),
        Box::new(AverageVolume::new(20)),
    ];
    for indicator in &indicators {
        for cut in [30, 60, 100, 150] {
            assert_no_lookahead(indicator.as_ref(), &bars, cut);
        }
    }
}

#[test]
fn enriched_rows_are_prefix_stable() {
    let bars = make_test_bars(200);
    let full = enrich(&bars).unwrap();

    for cut in [50, 75, 120, 199] {
        let prefix = enrich(&bars[..cut]).unwrap();
        for row in &prefix.rows {
            assert_eq!(Some(row), full.row_at(row.index), "row {} at cut {cut}", row.index);
        }
    }
}

#[test]
fn classification_of_prefix_matches_full_row_flags() {
    let bars = make_test_bars(150);
    let full = enrich(&bars).unwrap();

    for end in 50..bars.len() {
        let prefix = enrich(&bars[..=end]).unwrap();
        let from_full = full
            .row_at(end)
            .and_then(|row| setupscan_core::Setup::from_flags(&row.flags));
        assert_eq!(classify(&prefix), from_full, "bar {end}");
    }
}
