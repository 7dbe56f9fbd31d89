//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analytics::Metrics;
use crate::domain::backtest::{Backtest, BacktestConfig};
use crate::domain::error::BacksimError;
use crate::domain::strategy::{BuyAndHold, RsiMeanReversion, SmaCrossover, Strategy};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "backsim", about = "Historical trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory for equity/trades/metrics CSV exports
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Validate config and data without running the simulation
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a run configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show date range and bar count of a CSV data file
    Info {
        #[arg(short, long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            dry_run,
        } => run_backtest(&config, output.as_deref(), dry_run),
        Command::Validate { config } => run_validate(&config),
        Command::Info { data } => run_info(&data),
    }
}

pub fn load_config(path: &std::path::Path) -> Result<FileConfigAdapter, BacksimError> {
    FileConfigAdapter::from_file(path).map_err(|e| BacksimError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn run_backtest(
    config_path: &std::path::Path,
    output: Option<&std::path::Path>,
    dry_run: bool,
) -> ExitCode {
    match run_backtest_inner(config_path, output, dry_run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_backtest_inner(
    config_path: &std::path::Path,
    output: Option<&std::path::Path>,
    dry_run: bool,
) -> Result<(), BacksimError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    validate_run_config(&adapter)?;

    let bt_config = build_backtest_config(&adapter)?;
    let strategy = build_strategy(&adapter)?;

    let csv_path = data_csv_path(&adapter)?;
    eprintln!("Loading data from {}", csv_path);
    let data = CsvAdapter::new(&csv_path).fetch()?;
    eprintln!(
        "Loaded {} bars ({} to {})",
        data.len(),
        data.first_date(),
        data.last_date()
    );

    if dry_run {
        eprintln!("Dry run: config and data OK");
        return Ok(());
    }

    let result = Backtest::new(data, strategy, &bt_config)?.run()?;
    eprintln!(
        "Completed: {} steps, {} trades",
        result.values.len(),
        result.trades.len()
    );

    let metrics = Metrics::compute(&result);
    metrics.print();

    if let Some(dir) = output {
        CsvReportAdapter::new().write(&result, &metrics, dir)?;
        eprintln!("Results written to {}", dir.display());
    }

    Ok(())
}

fn run_validate(config_path: &std::path::Path) -> ExitCode {
    let result = load_config(config_path).and_then(|adapter| validate_run_config(&adapter));
    match result {
        Ok(()) => {
            println!("config OK");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_info(data_path: &std::path::Path) -> ExitCode {
    match CsvAdapter::new(data_path).fetch() {
        Ok(series) => {
            println!(
                "{} bars, {} to {}",
                series.len(),
                series.first_date(),
                series.last_date()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn data_csv_path(config: &dyn ConfigPort) -> Result<String, BacksimError> {
    config
        .get_string("data", "csv")
        .ok_or_else(|| BacksimError::ConfigMissing {
            section: "data".into(),
            key: "csv".into(),
        })
}

/// Fail-fast validation of every config field a run depends on.
pub fn validate_run_config(config: &dyn ConfigPort) -> Result<(), BacksimError> {
    data_csv_path(config)?;
    build_backtest_config(config)?.validate()?;
    build_strategy(config).map(|_| ())
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, BacksimError> {
    let cash_str = config.get_string("backtest", "initial_cash").ok_or_else(|| {
        BacksimError::ConfigMissing {
            section: "backtest".into(),
            key: "initial_cash".into(),
        }
    })?;
    let initial_cash = cash_str
        .parse::<f64>()
        .map_err(|_| BacksimError::ConfigInvalid {
            section: "backtest".into(),
            key: "initial_cash".into(),
            reason: "not a number".into(),
        })?;

    Ok(BacktestConfig {
        initial_cash,
        commission_rate: config.get_double("backtest", "commission_rate", 0.0),
        slippage: config.get_double("backtest", "slippage", 0.0),
    })
}

pub fn build_strategy(config: &dyn ConfigPort) -> Result<Box<dyn Strategy>, BacksimError> {
    let name = config.get_string("strategy", "name").ok_or_else(|| {
        BacksimError::ConfigMissing {
            section: "strategy".into(),
            key: "name".into(),
        }
    })?;

    match name.as_str() {
        "buy-and-hold" => Ok(Box::new(BuyAndHold)),
        "sma-crossover" => {
            let short = require_period(config, "short_period")?;
            let long = require_period(config, "long_period")?;
            if short >= long {
                return Err(BacksimError::ConfigInvalid {
                    section: "strategy".into(),
                    key: "short_period".into(),
                    reason: "short_period must be less than long_period".into(),
                });
            }
            Ok(Box::new(SmaCrossover::new(short, long)))
        }
        "rsi-mean-reversion" => {
            let period = require_period(config, "period")?;
            let lower = config.get_double("strategy", "lower", 30.0);
            let upper = config.get_double("strategy", "upper", 70.0);
            if !(0.0..=100.0).contains(&lower)
                || !(0.0..=100.0).contains(&upper)
                || lower >= upper
            {
                return Err(BacksimError::ConfigInvalid {
                    section: "strategy".into(),
                    key: "lower".into(),
                    reason: "thresholds must satisfy 0 <= lower < upper <= 100".into(),
                });
            }
            Ok(Box::new(RsiMeanReversion::new(period, lower, upper)))
        }
        other => Err(BacksimError::ConfigInvalid {
            section: "strategy".into(),
            key: "name".into(),
            reason: format!(
                "unknown strategy '{other}' (expected buy-and-hold, sma-crossover or rsi-mean-reversion)"
            ),
        }),
    }
}

fn require_period(config: &dyn ConfigPort, key: &str) -> Result<usize, BacksimError> {
    let value = config.get_int("strategy", key, 0);
    if value <= 0 {
        return Err(BacksimError::ConfigInvalid {
            section: "strategy".into(),
            key: key.into(),
            reason: "must be a positive integer".into(),
        });
    }
    Ok(value as usize)
}
