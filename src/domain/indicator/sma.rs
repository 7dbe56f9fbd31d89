//! Simple Moving Average.
//!
//! SMA(n) at index i = mean(close[i-n+1 ..= i]).
//! Warm-up: the first n-1 indices are undefined.
//! O(n) sliding window: one add and one subtract per bar.

use crate::domain::bar::PriceSeries;
use crate::domain::indicator::{Indicator, IndicatorSeries};

#[derive(Debug, Clone, Copy)]
pub struct Sma {
    pub period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Sma { period }
    }
}

impl Indicator for Sma {
    fn name(&self) -> String {
        format!("SMA({})", self.period)
    }

    fn compute(&self, data: &PriceSeries) -> IndicatorSeries {
        let bars = data.bars();
        let mut values = Vec::with_capacity(bars.len());

        if self.period == 0 {
            values.resize(bars.len(), None);
            return IndicatorSeries {
                name: self.name(),
                values,
            };
        }

        let mut window_sum = 0.0;
        for (i, bar) in bars.iter().enumerate() {
            window_sum += bar.close;
            if i >= self.period {
                window_sum -= bars[i - self.period].close;
            }

            if i + 1 >= self.period {
                values.push(Some(window_sum / self.period as f64));
            } else {
                values.push(None);
            }
        }

        IndicatorSeries {
            name: self.name(),
            values,
        }
    }
}
