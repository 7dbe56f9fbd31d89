//! Backtest engine and event loop.
//!
//! The run is a single deterministic pass over the price series. Per bar,
//! in this order: advance the cursor, let the strategy trade, then record
//! `cash + position * close` — so a trade at bar `i` is reflected in bar
//! `i`'s recorded value, priced at the same close it executed at.
//!
//! Lifecycle is encoded in ownership: `new` is the constructed-but-idle
//! engine (data validated, strategy initialized), `run` consumes it, and
//! the returned [`BacktestResult`] is the completed, immutable outcome.
//! There is no partial completion; a failing step fails the whole run.

use chrono::NaiveDate;

use super::bar::PriceSeries;
use super::broker::{Broker, Holdings, Trade};
use super::error::BacksimError;
use super::strategy::{SimContext, Strategy};

/// Simulation parameters supplied at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_cash: f64,
    pub commission_rate: f64,
    pub slippage: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_cash: 10_000.0,
            commission_rate: 0.0,
            slippage: 0.0,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), BacksimError> {
        if !self.initial_cash.is_finite() || self.initial_cash <= 0.0 {
            return Err(config_invalid("initial_cash", "must be positive"));
        }
        if !(0.0..1.0).contains(&self.commission_rate) {
            return Err(config_invalid("commission_rate", "must be in [0, 1)"));
        }
        if !self.slippage.is_finite() || self.slippage < 0.0 {
            return Err(config_invalid("slippage", "must be non-negative"));
        }
        Ok(())
    }
}

fn config_invalid(key: &str, reason: &str) -> BacksimError {
    BacksimError::ConfigInvalid {
        section: "backtest".into(),
        key: key.into(),
        reason: reason.into(),
    }
}

/// Portfolio value at one simulated step.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Completed run: one equity point per input bar, the executed trade log,
/// and the final holdings. Immutable hand-off to analytics and reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_cash: f64,
    pub values: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub final_holdings: Holdings,
}

impl BacktestResult {
    pub fn final_value(&self) -> f64 {
        // run() guarantees one point per bar and a non-empty series
        self.values.last().map(|p| p.value).unwrap_or(self.initial_cash)
    }
}

/// A constructed, not-yet-run simulation.
pub struct Backtest {
    strategy: Box<dyn Strategy>,
    ctx: SimContext,
}

impl Backtest {
    /// Validate config and data, build the broker and context, and run the
    /// strategy's `initialize` hook. Fails fast before any step executes.
    pub fn new(
        data: PriceSeries,
        mut strategy: Box<dyn Strategy>,
        config: &BacktestConfig,
    ) -> Result<Self, BacksimError> {
        config.validate()?;

        let broker = Broker::new(config.initial_cash, config.commission_rate, config.slippage);
        let mut ctx = SimContext::new(data, broker);
        strategy.initialize(&mut ctx)?;

        Ok(Backtest { strategy, ctx })
    }

    /// Execute the full pass. Consumes the engine; results are immutable.
    pub fn run(mut self) -> Result<BacktestResult, BacksimError> {
        let initial_cash = self.ctx.cash();
        let steps = self.ctx.len();
        let mut values = Vec::with_capacity(steps);

        for i in 0..steps {
            self.ctx.set_cursor(i);
            self.strategy.on_step(&mut self.ctx)?;

            let bar = &self.ctx.data().bars()[i];
            values.push(EquityPoint {
                date: bar.date,
                value: self.ctx.broker().portfolio_value(bar.close),
            });
        }

        let final_holdings = self.ctx.broker().holdings();
        let trades = self.ctx.into_broker().into_trades();

        Ok(BacktestResult {
            initial_cash,
            values,
            trades,
            final_holdings,
        })
    }
}
