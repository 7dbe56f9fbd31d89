//! CSV results export adapter.
//!
//! Writes three files into the output directory: `equity.csv` (the
//! per-bar portfolio values), `trades.csv` (the executed trade log) and
//! `metrics.csv` (one row of summary statistics).

use std::fs;
use std::path::Path;

use crate::domain::analytics::Metrics;
use crate::domain::backtest::BacktestResult;
use crate::domain::broker::TradeAction;
use crate::domain::error::BacksimError;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        CsvReportAdapter
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_dir: &Path,
    ) -> Result<(), BacksimError> {
        fs::create_dir_all(output_dir)?;

        write_equity(result, &output_dir.join("equity.csv"))?;
        write_trades(result, &output_dir.join("trades.csv"))?;
        write_metrics(metrics, &output_dir.join("metrics.csv"))?;

        Ok(())
    }
}

fn csv_error(path: &Path, e: csv::Error) -> BacksimError {
    BacksimError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

fn write_equity(result: &BacktestResult, path: &Path) -> Result<(), BacksimError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    wtr.write_record(["date", "portfolio_value"])
        .map_err(|e| csv_error(path, e))?;
    for point in &result.values {
        wtr.write_record([point.date.to_string(), format!("{:.6}", point.value)])
            .map_err(|e| csv_error(path, e))?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_trades(result: &BacktestResult, path: &Path) -> Result<(), BacksimError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    wtr.write_record(["date", "action", "price", "amount"])
        .map_err(|e| csv_error(path, e))?;
    for trade in &result.trades {
        let action = match trade.action {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
        };
        wtr.write_record([
            trade.date.to_string(),
            action.to_string(),
            format!("{:.6}", trade.price),
            trade.amount.to_string(),
        ])
        .map_err(|e| csv_error(path, e))?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_metrics(metrics: &Metrics, path: &Path) -> Result<(), BacksimError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    wtr.write_record([
        "total_return",
        "annualized_return",
        "volatility",
        "sharpe_ratio",
        "max_drawdown",
    ])
    .map_err(|e| csv_error(path, e))?;
    wtr.write_record([
        format!("{:.6}", metrics.total_return),
        format!("{:.6}", metrics.annualized_return),
        format!("{:.6}", metrics.volatility),
        format!("{:.6}", metrics.sharpe_ratio),
        format!("{:.6}", metrics.max_drawdown),
    ])
    .map_err(|e| csv_error(path, e))?;
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::broker::{Holdings, Trade};
    use crate::domain::backtest::EquityPoint;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample_result() -> BacktestResult {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        BacktestResult {
            initial_cash: 100.0,
            values: vec![
                EquityPoint { date: d1, value: 100.0 },
                EquityPoint { date: d2, value: 120.0 },
            ],
            trades: vec![Trade {
                action: TradeAction::Buy,
                price: 10.0,
                amount: 10,
                date: d1,
            }],
            final_holdings: Holdings {
                cash: 0.0,
                position: 10,
            },
        }
    }

    #[test]
    fn writes_all_three_files() {
        let dir = tempdir().unwrap();
        let result = sample_result();
        let metrics = Metrics::compute(&result);

        CsvReportAdapter::new()
            .write(&result, &metrics, dir.path())
            .unwrap();

        assert!(dir.path().join("equity.csv").exists());
        assert!(dir.path().join("trades.csv").exists());
        assert!(dir.path().join("metrics.csv").exists());
    }

    #[test]
    fn equity_csv_has_one_row_per_point() {
        let dir = tempdir().unwrap();
        let result = sample_result();
        let metrics = Metrics::compute(&result);

        CsvReportAdapter::new()
            .write(&result, &metrics, dir.path())
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join("equity.csv")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "date,portfolio_value");
        assert!(lines[1].starts_with("2024-01-01,"));
    }

    #[test]
    fn trades_csv_records_actions() {
        let dir = tempdir().unwrap();
        let result = sample_result();
        let metrics = Metrics::compute(&result);

        CsvReportAdapter::new()
            .write(&result, &metrics, dir.path())
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join("trades.csv")).unwrap();
        assert!(content.contains("buy"));
        assert!(content.contains(",10"));
    }

    #[test]
    fn creates_missing_output_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("reports").join("run1");
        let result = sample_result();
        let metrics = Metrics::compute(&result);

        CsvReportAdapter::new()
            .write(&result, &metrics, &nested)
            .unwrap();

        assert!(nested.join("equity.csv").exists());
    }
}
