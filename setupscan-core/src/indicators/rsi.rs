//! Relative Strength Index (RSI), Wilder-smoothed.
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss). The averages are seeded with
//! the plain mean of the first `period` close-to-close changes, then smoothed
//! with alpha = 1/period. Lookback: period.
//!
//! An unseeded, bias-adjusted EWM of the same alpha differs by well under one
//! RSI point once a few dozen bars have passed. A window with no price change
//! reads 50 here instead of undefined, so flat stretches keep their rows.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

/// Running Wilder averages of gains and losses.
#[derive(Debug, Clone, Copy)]
struct WilderAverages {
    gain: f64,
    loss: f64,
}

impl WilderAverages {
    fn seed(changes: &[f64]) -> Self {
        let n = changes.len() as f64;
        let gain = changes.iter().filter(|c| **c > 0.0).sum::<f64>() / n;
        let loss = -changes.iter().filter(|c| **c < 0.0).sum::<f64>() / n;
        Self { gain, loss }
    }

    fn update(&mut self, change: f64, alpha: f64) {
        self.gain = alpha * change.max(0.0) + (1.0 - alpha) * self.gain;
        self.loss = alpha * (-change).max(0.0) + (1.0 - alpha) * self.loss;
    }

    fn rsi(&self) -> f64 {
        match (self.gain == 0.0, self.loss == 0.0) {
            (true, true) => 50.0,
            (false, true) => 100.0,
            (true, false) => 0.0,
            (false, false) => 100.0 - 100.0 / (1.0 + self.gain / self.loss),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n <= self.period {
            return result;
        }

        // changes[k] is close[k+1] - close[k]
        let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

        let seed = &changes[..self.period];
        if seed.iter().any(|c| c.is_nan()) {
            return result;
        }
        let mut averages = WilderAverages::seed(seed);
        result[self.period] = averages.rsi();

        let alpha = 1.0 / self.period as f64;
        for i in (self.period + 1)..n {
            let change = changes[i - 1];
            if change.is_nan() {
                // A gap poisons every later value.
                break;
            }
            averages.update(change, alpha);
            result[i] = averages.rsi();
        }

        result
    }
}
