//! CSV price-history provider.
//!
//! Reads `<dir>/<SYMBOL>.csv` with a header containing Date, Open, High, Low,
//! Close and Volume (any order, case-insensitive; extra columns ignored). A
//! missing file means "no data". The requested period is measured back from
//! the last bar in the file so fixtures do not go stale.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::provider::{DataError, DataProvider, Interval, Period, SchemaError};
use crate::domain::Bar;

const REQUIRED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol.to_ascii_uppercase()))
    }
}

/// Parse bars from CSV text. Rows are sorted by date; a repeated date keeps the last row.
pub fn parse_bars<R: std::io::Read>(reader: R) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| DataError::Other(format!("read CSV header: {e}")))?
        .clone();

    let mut idx = [0usize; 6];
    for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))?;
    }
    let [date_i, open_i, high_i, low_i, close_i, volume_i] = idx;

    let mut bars = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        // header is line 1
        let line = row + 2;
        let record = record.map_err(|e| SchemaError::Parse {
            line,
            reason: e.to_string(),
        })?;
        let get = |i: usize| record.get(i).unwrap_or("");
        let num = |i: usize, name: &str| -> Result<f64, SchemaError> {
            get(i).parse::<f64>().map_err(|_| SchemaError::Parse {
                line,
                reason: format!("invalid {name} '{}'", get(i)),
            })
        };

        let raw_date = get(date_i);
        let date = raw_date
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .ok_or_else(|| SchemaError::Parse {
                line,
                reason: format!("invalid date '{raw_date}'"),
            })?;
        let volume = num(volume_i, "volume")?;

        bars.push(Bar {
            date,
            open: num(open_i, "open")?,
            high: num(high_i, "high")?,
            low: num(low_i, "low")?,
            close: num(close_i, "close")?,
            volume: volume.max(0.0).round() as u64,
        });
    }

    bars.sort_by_key(|b| b.date);
    let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => deduped.push(bar),
        }
    }
    Ok(deduped)
}

/// Load a CSV file; a missing file yields no bars.
pub fn load_file(path: &Path) -> Result<Vec<Bar>, DataError> {
    match std::fs::File::open(path) {
        Ok(file) => parse_bars(file),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(DataError::Io(e)),
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    /// Files are assumed to hold bars at the requested interval already.
    fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        _interval: Interval,
    ) -> Result<Vec<Bar>, DataError> {
        let bars = load_file(&self.path_for(symbol))?;
        let Some(last) = bars.last().map(|b| b.date) else {
            return Ok(bars);
        };
        let start = period.start_date(last);
        Ok(bars.into_iter().filter(|b| b.date > start).collect())
    }
}
