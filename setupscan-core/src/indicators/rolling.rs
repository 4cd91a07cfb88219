//! Rolling window extremes and averages over non-close fields.
//!
//! Both windows include the current bar. Lookback: period - 1.

use super::sma::rolling_mean;
use super::Indicator;
use crate::domain::Bar;

/// Highest high over the trailing `period` bars.
#[derive(Debug, Clone)]
pub struct RollingHigh {
    period: usize,
    name: String,
}

impl RollingHigh {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RollingHigh period must be >= 1");
        Self {
            period,
            name: format!("rolling_high_{period}"),
        }
    }
}

impl Indicator for RollingHigh {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }
        for i in (self.period - 1)..n {
            let window = &bars[(i + 1 - self.period)..=i];
            if window.iter().any(|b| b.high.is_nan()) {
                continue;
            }
            result[i] = window
                .iter()
                .map(|b| b.high)
                .fold(f64::NEG_INFINITY, f64::max);
        }
        result
    }
}

/// Mean volume over the trailing `period` bars.
#[derive(Debug, Clone)]
pub struct AverageVolume {
    period: usize,
    name: String,
}

impl AverageVolume {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "AverageVolume period must be >= 1");
        Self {
            period,
            name: format!("avg_volume_{period}"),
        }
    }
}

impl Indicator for AverageVolume {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();
        rolling_mean(&volumes, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn rolling_high_includes_current_bar() {
        // make_bars: high = max(open, close) + 1
        let bars = make_bars(&[10.0, 12.0, 11.0, 15.0]);
        let result = RollingHigh::new(3).compute(&bars);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 13.0, DEFAULT_EPSILON);
        assert_approx(result[3], 16.0, DEFAULT_EPSILON);
    }

    #[test]
    fn average_volume_window() {
        let mut bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        for (i, bar) in bars.iter_mut().enumerate() {
            bar.volume = (i as u64 + 1) * 100;
        }
        let result = AverageVolume::new(2).compute(&bars);
        assert!(result[0].is_nan());
        assert_approx(result[1], 150.0, DEFAULT_EPSILON);
        assert_approx(result[3], 350.0, DEFAULT_EPSILON);
    }

    #[test]
    fn names_and_lookback() {
        assert_eq!(RollingHigh::new(20).name(), "rolling_high_20");
        assert_eq!(AverageVolume::new(20).lookback(), 19);
    }
}
