//! Results export port trait.

use std::path::Path;

use crate::domain::analytics::Metrics;
use crate::domain::backtest::BacktestResult;
use crate::domain::error::BacksimError;

/// Port for persisting a completed run.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        metrics: &Metrics,
        output_dir: &Path,
    ) -> Result<(), BacksimError>;
}
