//! Relative Strength Index.
//!
//! Rolling-mean variant: average gain and average loss are plain arithmetic
//! means over the trailing `period` day-over-day deltas (no Wilder
//! smoothing). RSI = 100 - 100 / (1 + avg_gain / avg_loss).
//!
//! When the rolling average loss is exactly zero the value is defined as
//! 100 (the no-losses boundary), so strategies never see an undefined value
//! past the warm-up window.
//!
//! Warm-up: the first `period` indices are undefined (the first delta only
//! exists at index 1).

use crate::domain::bar::PriceSeries;
use crate::domain::indicator::{Indicator, IndicatorSeries};

#[derive(Debug, Clone, Copy)]
pub struct Rsi {
    pub period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Rsi { period }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> String {
        format!("RSI({})", self.period)
    }

    fn compute(&self, data: &PriceSeries) -> IndicatorSeries {
        let bars = data.bars();
        let mut values: Vec<Option<f64>> = Vec::with_capacity(bars.len());

        if self.period == 0 || bars.len() < 2 {
            values.resize(bars.len(), None);
            return IndicatorSeries {
                name: self.name(),
                values,
            };
        }

        // gains[j] / losses[j] correspond to the delta into bar j+1.
        let mut gains = Vec::with_capacity(bars.len() - 1);
        let mut losses = Vec::with_capacity(bars.len() - 1);
        for pair in bars.windows(2) {
            let change = pair[1].close - pair[0].close;
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
        }

        let mut gain_sum = 0.0;
        let mut loss_sum = 0.0;

        values.push(None); // no delta exists at index 0

        for i in 1..bars.len() {
            let j = i - 1;
            gain_sum += gains[j];
            loss_sum += losses[j];
            if j >= self.period {
                gain_sum -= gains[j - self.period];
                loss_sum -= losses[j - self.period];
            }

            if i < self.period {
                values.push(None);
                continue;
            }

            let avg_gain = gain_sum / self.period as f64;
            let avg_loss = loss_sum / self.period as f64;

            let rsi = if avg_loss == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
            };
            values.push(Some(rsi));
        }

        IndicatorSeries {
            name: self.name(),
            values,
        }
    }
}
