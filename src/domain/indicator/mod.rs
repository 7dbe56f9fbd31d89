//! Derived indicator series and the indicator capability trait.
//!
//! An indicator is a pure function over the whole price series, computed
//! once before the simulation loop starts. Its output is aligned
//! index-for-index with the input; `None` marks the warm-up window where
//! not enough history exists. Values at index `i` must depend only on bars
//! `0..=i` so the simulation never reads the future.

pub mod rsi;
pub mod sma;

use super::bar::PriceSeries;

/// A named, full-length derived series. Immutable after computation.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// Value at `index`; `None` both inside the warm-up window and past the
    /// end of the series.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Capability contract for indicator variants.
///
/// Implementations must be deterministic, produce a series the same length
/// as the input, mark the warm-up region with `None`, and never use bars
/// beyond the index being computed.
pub trait Indicator {
    /// Registration key, e.g. `SMA(20)`.
    fn name(&self) -> String;

    fn compute(&self, data: &PriceSeries) -> IndicatorSeries;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_at_warm_up_is_none() {
        let series = IndicatorSeries {
            name: "TEST".into(),
            values: vec![None, None, Some(3.0)],
        };
        assert_eq!(series.value_at(0), None);
        assert_eq!(series.value_at(1), None);
        assert_eq!(series.value_at(2), Some(3.0));
    }

    #[test]
    fn value_at_out_of_range_is_none() {
        let series = IndicatorSeries {
            name: "TEST".into(),
            values: vec![Some(1.0)],
        };
        assert_eq!(series.value_at(9), None);
    }
}
