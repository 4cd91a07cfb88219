//! Deterministic synthetic price series.
//!
//! Random walks are seeded from the symbol name so every run of the same
//! symbol sees the same bars. The named scenarios are hand-shaped series
//! with a known setup history, used for offline demos and regression tests.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataProvider, Interval, Period};
use crate::domain::Bar;

/// Provider that fabricates a random walk per symbol. Never fails.
#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    end: Option<NaiveDate>,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the last generated date instead of using today.
    pub fn ending_on(end: NaiveDate) -> Self {
        Self { end: Some(end) }
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<Bar>, DataError> {
        let end = self.end.unwrap_or_else(|| Local::now().date_naive());
        let start = match period {
            // Ten years of history stands in for "everything".
            Period::Max => Period::Years(10).start_date(end),
            p => p.start_date(end),
        };
        let bars = random_walk(symbol, start, end);
        Ok(match interval {
            Interval::Daily => bars,
            Interval::Weekly => to_weekly(&bars),
        })
    }
}

/// Random walk from 100.0 over weekdays in `[start, end]`.
///
/// Daily returns are drawn from ±3%, wicks extend up to 1% beyond the body.
pub fn random_walk(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if is_weekend(current) {
            current += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(Bar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += Duration::days(1);
    }

    bars
}

/// Collapse daily bars into ISO-week bars.
fn to_weekly(daily: &[Bar]) -> Vec<Bar> {
    let mut weeks: Vec<Bar> = Vec::new();
    for bar in daily {
        match weeks.last_mut() {
            Some(week) if week.date.iso_week() == bar.date.iso_week() => {
                week.high = week.high.max(bar.high);
                week.low = week.low.min(bar.low);
                week.close = bar.close;
                week.volume = week.volume.saturating_add(bar.volume);
            }
            _ => weeks.push(bar.clone()),
        }
    }
    weeks
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// `n` consecutive weekdays starting at 2024-01-02.
pub fn trading_days(n: usize) -> Vec<NaiveDate> {
    let mut current = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or(NaiveDate::MIN);
    let mut days = Vec::with_capacity(n);
    while days.len() < n {
        if !is_weekend(current) {
            days.push(current);
        }
        current += Duration::days(1);
    }
    days
}

fn bar(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Bar {
    Bar {
        date,
        open,
        high,
        low,
        close,
        volume,
    }
}

/// Flat series: every bar has the same open, close and range. Never a setup.
pub fn flat(n: usize, price: f64) -> Vec<Bar> {
    trading_days(n)
        .into_iter()
        .map(|d| bar(d, price, price + 0.5, price - 0.5, price, 1_000))
        .collect()
}

/// Close rises by 1.0 every bar and each close is the bar's high, so every
/// bar from the first enriched one onward is a Breakout.
pub fn rising(n: usize) -> Vec<Bar> {
    trading_days(n)
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            let close = 100.0 + i as f64;
            bar(d, close - 0.2, close, close - 0.5, close, 1_000)
        })
        .collect()
}

/// Raw index of the only setup bar in [`breakout_scenario`].
pub const BREAKOUT_BAR: usize = 60;

/// 120 bars with exactly one setup: a Breakout at [`BREAKOUT_BAR`].
///
/// Bars 0..=50 and 71.. are flat at 100 with a 110 ceiling. Bars 51..=70 climb
/// 1.02 per bar; bar 60 is the first close above 110 and prints a 130 wick
/// that caps every later close inside the 20-bar window. Volume is constant.
pub fn breakout_scenario() -> Vec<Bar> {
    trading_days(120)
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            if !(51..=70).contains(&i) {
                return bar(d, 100.0, 110.0, 100.0, 100.0, 1_000);
            }
            let close = 100.0 + (i - 50) as f64 * 1.02;
            let high = if i == BREAKOUT_BAR { 130.0 } else { close + 0.2 };
            bar(d, close - 0.3, high, close - 0.5, close, 1_000)
        })
        .collect()
}

/// 80-bar steady uptrend whose last bar is a Bullish Momentum setup on a
/// 5x volume spike. A wick ten bars back blocks a Breakout; RSI is 100.
pub fn momentum_scenario() -> Vec<Bar> {
    const N: usize = 80;
    trading_days(N)
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            let close = 100.0 + 0.5 * i as f64;
            let high = if i == N - 10 { close + 50.0 } else { close + 0.3 };
            let volume = if i == N - 1 { 5_000 } else { 1_000 };
            bar(d, close - 0.2, high, close - 0.3, close, volume)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::is_chronological;

    #[test]
    fn random_walk_is_deterministic_per_symbol() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let a = random_walk("AAA", start, end);
        let b = random_walk("AAA", start, end);
        let c = random_walk("BBB", start, end);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(is_chronological(&a));
        assert!(a.iter().all(|b| !is_weekend(b.date)));
        assert!(a.iter().all(Bar::is_sane));
    }

    #[test]
    fn provider_covers_period() {
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let provider = SyntheticProvider::ending_on(end);
        let bars = provider
            .fetch_series("XYZ", Period::Years(1), Interval::Daily)
            .unwrap();
        assert!(bars.len() > 250);
        assert_eq!(bars.last().unwrap().date, end);
    }

    #[test]
    fn weekly_bars_aggregate_days() {
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let provider = SyntheticProvider::ending_on(end);
        let daily = provider
            .fetch_series("XYZ", Period::Months(3), Interval::Daily)
            .unwrap();
        let weekly = provider
            .fetch_series("XYZ", Period::Months(3), Interval::Weekly)
            .unwrap();
        assert!(weekly.len() < daily.len());
        let total: u64 = daily.iter().map(|b| b.volume).sum();
        assert_eq!(weekly.iter().map(|b| b.volume).sum::<u64>(), total);
        assert_eq!(weekly.last().unwrap().close, daily.last().unwrap().close);
    }

    #[test]
    fn trading_days_skip_weekends() {
        let days = trading_days(10);
        assert_eq!(days.len(), 10);
        assert!(days.iter().all(|d| !is_weekend(*d)));
        assert!(days.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn scenarios_have_expected_lengths() {
        assert_eq!(breakout_scenario().len(), 120);
        assert_eq!(momentum_scenario().len(), 80);
        assert_eq!(rising(70).len(), 70);
        assert_eq!(flat(40, 20.0).len(), 40);
    }
}
