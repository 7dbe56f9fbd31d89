#![allow(dead_code)]

use chrono::NaiveDate;

pub use backsim::domain::bar::{PriceBar, PriceSeries};
use backsim::domain::error::BacksimError;
use backsim::ports::data_port::DataPort;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(day_offset: u64, close: f64) -> PriceBar {
    PriceBar::close_only(date(2024, 1, 1) + chrono::Days::new(day_offset), close)
}

/// Daily close-only series starting 2024-01-01.
pub fn make_series(closes: &[f64]) -> PriceSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i as u64, close))
        .collect();
    PriceSeries::new(bars).unwrap()
}

pub struct MockDataPort {
    pub closes: Vec<f64>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(closes: &[f64]) -> Self {
        Self {
            closes: closes.to_vec(),
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            closes: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch(&self) -> Result<PriceSeries, BacksimError> {
        if let Some(reason) = &self.error {
            return Err(BacksimError::Data {
                reason: reason.clone(),
            });
        }
        Ok(make_series(&self.closes))
    }
}
