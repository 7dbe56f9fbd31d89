//! Price bar and validated price series.

use chrono::NaiveDate;

use super::error::BacksimError;

/// One row of time-stamped price data. Only the close is mandatory; the
/// ingestion layer may leave the other fields unset.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<i64>,
}

impl PriceBar {
    /// A bar carrying only a close, for series where OHLV data is absent.
    pub fn close_only(date: NaiveDate, close: f64) -> Self {
        PriceBar {
            date,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }
}

/// An ordered, gap-free sequence of price bars.
///
/// Construction validates the invariants the engine relies on: the series
/// is non-empty, dates are strictly increasing, and every close is finite.
/// A series that fails validation never reaches the simulation loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, BacksimError> {
        if bars.is_empty() {
            return Err(BacksimError::MalformedInput {
                reason: "price series is empty".into(),
            });
        }

        for (i, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() {
                return Err(BacksimError::MalformedInput {
                    reason: format!("non-finite close at index {} ({})", i, bar.date),
                });
            }
        }

        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(BacksimError::MalformedInput {
                    reason: format!(
                        "dates not strictly increasing: {} followed by {}",
                        pair[0].date, pair[1].date
                    ),
                });
            }
        }

        Ok(PriceSeries { bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bar(&self, index: usize) -> Option<&PriceBar> {
        self.bars.get(index)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn close(&self, index: usize) -> Option<f64> {
        self.bars.get(index).map(|b| b.close)
    }

    pub fn date(&self, index: usize) -> Option<NaiveDate> {
        self.bars.get(index).map(|b| b.date)
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar::close_only(NaiveDate::from_ymd_opt(2024, 1, day).unwrap(), close)
    }

    #[test]
    fn valid_series() {
        let series = PriceSeries::new(vec![bar(1, 100.0), bar(2, 101.0), bar(3, 99.5)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.close(1), Some(101.0));
        assert_eq!(series.date(0), Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
    }

    #[test]
    fn empty_series_rejected() {
        let result = PriceSeries::new(vec![]);
        assert!(matches!(result, Err(BacksimError::MalformedInput { .. })));
    }

    #[test]
    fn duplicate_date_rejected() {
        let result = PriceSeries::new(vec![bar(1, 100.0), bar(1, 101.0)]);
        assert!(matches!(result, Err(BacksimError::MalformedInput { .. })));
    }

    #[test]
    fn out_of_order_dates_rejected() {
        let result = PriceSeries::new(vec![bar(2, 100.0), bar(1, 101.0)]);
        assert!(matches!(result, Err(BacksimError::MalformedInput { .. })));
    }

    #[test]
    fn nan_close_rejected() {
        let result = PriceSeries::new(vec![bar(1, 100.0), bar(2, f64::NAN)]);
        assert!(matches!(result, Err(BacksimError::MalformedInput { .. })));
    }

    #[test]
    fn close_out_of_range_is_none() {
        let series = PriceSeries::new(vec![bar(1, 100.0)]).unwrap();
        assert_eq!(series.close(5), None);
        assert_eq!(series.date(5), None);
    }

    #[test]
    fn first_and_last_date() {
        let series = PriceSeries::new(vec![bar(1, 100.0), bar(5, 102.0)]).unwrap();
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }
}
