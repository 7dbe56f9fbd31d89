//! Performance metrics over a completed run's equity curve.

use super::backtest::{BacktestResult, EquityPoint};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

impl Metrics {
    /// Compute metrics from the equity curve. Pure; safe to call any
    /// number of times on the same result.
    pub fn compute(result: &BacktestResult) -> Self {
        let values = &result.values;

        let first = values.first().map(|p| p.value).unwrap_or(result.initial_cash);
        let last = values.last().map(|p| p.value).unwrap_or(result.initial_cash);

        let total_return = if first > 0.0 { last / first - 1.0 } else { 0.0 };

        let steps = values.len() as f64;
        let annualized_return = if steps > 0.0 && total_return > -1.0 {
            (1.0 + total_return).powf(TRADING_DAYS_PER_YEAR / steps) - 1.0
        } else {
            0.0
        };

        let returns = step_returns(values);
        let (mean, stddev) = mean_stddev(&returns);

        let volatility = stddev * TRADING_DAYS_PER_YEAR.sqrt();
        let sharpe_ratio = if stddev > 0.0 {
            mean / stddev * TRADING_DAYS_PER_YEAR.sqrt()
        } else {
            0.0
        };

        let max_drawdown = compute_max_drawdown(values);

        Metrics {
            total_return,
            annualized_return,
            volatility,
            sharpe_ratio,
            max_drawdown,
        }
    }

    pub fn print(&self) {
        println!("Total Return:      {:.2}%", self.total_return * 100.0);
        println!("Annualized Return: {:.2}%", self.annualized_return * 100.0);
        println!("Volatility:        {:.2}%", self.volatility * 100.0);
        println!("Sharpe Ratio:      {:.2}", self.sharpe_ratio);
        println!("Max Drawdown:      {:.2}%", self.max_drawdown * 100.0);
    }
}

/// Step-over-step fractional returns; the first step's return is 0.
fn step_returns(values: &[EquityPoint]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(values.len().saturating_sub(1));
    for pair in values.windows(2) {
        let prev = pair[0].value;
        returns.push(if prev > 0.0 {
            pair[1].value / prev - 1.0
        } else {
            0.0
        });
    }
    returns
}

fn mean_stddev(xs: &[f64]) -> (f64, f64) {
    if xs.is_empty() {
        return (0.0, 0.0);
    }
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    if xs.len() < 2 {
        return (mean, 0.0);
    }
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

/// Deepest peak-to-trough decline, as a negative fraction (0 = no decline).
fn compute_max_drawdown(values: &[EquityPoint]) -> f64 {
    let mut running_max = f64::NEG_INFINITY;
    let mut max_drawdown = 0.0_f64;

    for point in values {
        running_max = running_max.max(point.value);
        if running_max > 0.0 {
            let drawdown = (point.value - running_max) / running_max;
            max_drawdown = max_drawdown.min(drawdown);
        }
    }

    max_drawdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::broker::Holdings;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_result(values: &[f64]) -> BacktestResult {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| EquityPoint {
                date: start + chrono::Days::new(i as u64),
                value,
            })
            .collect();
        BacktestResult {
            initial_cash: values.first().copied().unwrap_or(0.0),
            values: points,
            trades: Vec::new(),
            final_holdings: Holdings {
                cash: values.last().copied().unwrap_or(0.0),
                position: 0,
            },
        }
    }

    #[test]
    fn total_return() {
        let metrics = Metrics::compute(&make_result(&[100.0, 110.0, 120.0]));
        assert_relative_eq!(metrics.total_return, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn flat_curve_is_all_zero() {
        let metrics = Metrics::compute(&make_result(&[100.0, 100.0, 100.0]));
        assert_relative_eq!(metrics.total_return, 0.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.volatility, 0.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.sharpe_ratio, 0.0, epsilon = 1e-12);
        assert_relative_eq!(metrics.max_drawdown, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn max_drawdown_simple() {
        // peak 120, trough 90: drawdown -25%
        let metrics = Metrics::compute(&make_result(&[100.0, 120.0, 90.0, 110.0]));
        assert_relative_eq!(metrics.max_drawdown, -0.25, epsilon = 1e-12);
    }

    #[test]
    fn max_drawdown_monotone_rise_is_zero() {
        let metrics = Metrics::compute(&make_result(&[100.0, 105.0, 111.0]));
        assert_relative_eq!(metrics.max_drawdown, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn annualized_return_one_year_matches_total() {
        let mut values = vec![100.0];
        // 252 equal steps up to 110
        let step = (110.0_f64 / 100.0).powf(1.0 / 252.0);
        for i in 1..=252 {
            values.push(100.0 * step.powi(i));
        }
        let metrics = Metrics::compute(&make_result(&values));
        // 253 points = 253 "days"; close to but not exactly one year
        assert!(metrics.annualized_return > 0.0);
        assert_relative_eq!(metrics.total_return, 0.1, epsilon = 1e-9);
    }

    #[test]
    fn sharpe_positive_for_steady_gains() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 + (i % 2) as f64).collect();
        let metrics = Metrics::compute(&make_result(&values));
        assert!(metrics.sharpe_ratio > 0.0);
    }

    #[test]
    fn empty_curve_degrades_gracefully() {
        let result = BacktestResult {
            initial_cash: 100.0,
            values: Vec::new(),
            trades: Vec::new(),
            final_holdings: Holdings {
                cash: 100.0,
                position: 0,
            },
        };
        let metrics = Metrics::compute(&result);
        assert_relative_eq!(metrics.total_return, 0.0, epsilon = 1e-12);
    }
}
