//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol over one trading period.
///
/// Immutable once produced by a data provider. A series of bars is ordered
/// ascending by date with no duplicate dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Name of the first OHLC field that is NaN, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.open.is_nan() {
            Some("open")
        } else if self.high.is_nan() {
            Some("high")
        } else if self.low.is_nan() {
            Some("low")
        } else if self.close.is_nan() {
            Some("close")
        } else {
            None
        }
    }

    /// Returns true if any OHLC field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.missing_field().is_some()
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Check that bars are strictly ascending by date.
pub fn is_chronological(bars: &[Bar]) -> bool {
    bars.windows(2).all(|w| w[0].date < w[1].date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.low = f64::NAN;
        assert!(bar.is_void());
        assert_eq!(bar.missing_field(), Some("low"));
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn chronological_order() {
        let a = sample_bar();
        let mut b = sample_bar();
        b.date = a.date.succ_opt().unwrap();
        assert!(is_chronological(&[a.clone(), b.clone()]));
        assert!(!is_chronological(&[b, a]));
    }
}
