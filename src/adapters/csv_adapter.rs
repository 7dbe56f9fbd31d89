//! CSV file data adapter.
//!
//! Reads a CSV with a header row containing at least `Date` and `Close`
//! (OHLV columns are picked up when present), sorts rows by date, then
//! forward-fills and backward-fills blank numeric cells so the core
//! receives a gap-free series. A close that is still missing after both
//! fill passes is a data error.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::bar::{PriceBar, PriceSeries};
use crate::domain::error::BacksimError;
use crate::ports::data_port::DataPort;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

/// A parsed row before gap-filling; every numeric cell may be blank.
#[derive(Debug, Clone)]
struct RawRow {
    date: NaiveDate,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<i64>,
}

impl DataPort for CsvAdapter {
    fn fetch(&self) -> Result<PriceSeries, BacksimError> {
        let mut rdr = csv::Reader::from_path(&self.path).map_err(|e| BacksimError::Data {
            reason: format!("failed to open {}: {}", self.path.display(), e),
        })?;

        let headers = rdr
            .headers()
            .map_err(|e| BacksimError::Data {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();

        let col = |name: &str| -> Option<usize> {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let date_col = col("date").ok_or_else(|| BacksimError::Data {
            reason: format!("missing Date column in {}", self.path.display()),
        })?;
        let close_col = col("close").ok_or_else(|| BacksimError::Data {
            reason: format!("missing Close column in {}", self.path.display()),
        })?;
        let open_col = col("open");
        let high_col = col("high");
        let low_col = col("low");
        let volume_col = col("volume");

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| BacksimError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_col).unwrap_or("").trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                BacksimError::Data {
                    reason: format!("invalid date '{}': {}", date_str, e),
                }
            })?;

            rows.push(RawRow {
                date,
                open: open_col.and_then(|c| parse_cell(&record, c)),
                high: high_col.and_then(|c| parse_cell(&record, c)),
                low: low_col.and_then(|c| parse_cell(&record, c)),
                close: parse_cell(&record, close_col),
                volume: volume_col
                    .and_then(|c| parse_cell(&record, c))
                    .map(|v| v as i64),
            });
        }

        rows.sort_by_key(|r| r.date);
        fill_gaps(&mut rows);

        let mut bars = Vec::with_capacity(rows.len());
        for row in rows {
            let close = row.close.ok_or_else(|| BacksimError::Data {
                reason: format!("no close available for {} after gap filling", row.date),
            })?;
            bars.push(PriceBar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close,
                volume: row.volume,
            });
        }

        PriceSeries::new(bars)
    }
}

fn parse_cell(record: &csv::StringRecord, index: usize) -> Option<f64> {
    let cell = record.get(index)?.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Forward-fill then backward-fill each numeric column, mirroring the
/// sortedness-and-gap-filling guarantee the core expects from ingestion.
fn fill_gaps(rows: &mut [RawRow]) {
    fill_column(rows, |r| &mut r.open);
    fill_column(rows, |r| &mut r.high);
    fill_column(rows, |r| &mut r.low);
    fill_column(rows, |r| &mut r.close);

    let mut last = None;
    for row in rows.iter_mut() {
        match row.volume {
            Some(v) => last = Some(v),
            None => row.volume = last,
        }
    }
    let mut next = None;
    for row in rows.iter_mut().rev() {
        match row.volume {
            Some(v) => next = Some(v),
            None => row.volume = next,
        }
    }
}

fn fill_column<F>(rows: &mut [RawRow], mut field: F)
where
    F: FnMut(&mut RawRow) -> &mut Option<f64>,
{
    let mut last = None;
    for row in rows.iter_mut() {
        let cell = field(row);
        match *cell {
            Some(v) => last = Some(v),
            None => *cell = last,
        }
    }
    let mut next = None;
    for row in rows.iter_mut().rev() {
        let cell = field(row);
        match *cell {
            Some(v) => next = Some(v),
            None => *cell = next,
        }
    }
}
