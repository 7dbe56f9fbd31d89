//! Strategy capability contract and the shared simulation context.
//!
//! A strategy is a stateful policy over two callbacks: `initialize` runs
//! once before the loop and registers indicators; `on_step` runs once per
//! bar and may place orders. All state a strategy is allowed to observe
//! lives in [`SimContext`]: the price series, the broker, the precomputed
//! indicator map, and the cursor. The cursor is advanced only by the
//! engine, so strategy and broker always agree on "now".

use std::collections::HashMap;

use super::bar::PriceSeries;
use super::broker::{Broker, OrderSize};
use super::error::BacksimError;
use super::indicator::{Indicator, IndicatorSeries};

/// Shared simulation state, exclusively owned by one backtest run.
#[derive(Debug)]
pub struct SimContext {
    data: PriceSeries,
    broker: Broker,
    indicators: HashMap<String, IndicatorSeries>,
    cursor: usize,
}

impl SimContext {
    pub(crate) fn new(data: PriceSeries, broker: Broker) -> Self {
        SimContext {
            data,
            broker,
            indicators: HashMap::new(),
            cursor: 0,
        }
    }

    /// Compute an indicator over the full series and bind it under its
    /// name. Eager by design: values a strategy reads later can only
    /// depend on price history, never on broker state.
    pub fn register_indicator(&mut self, indicator: &dyn Indicator) -> String {
        let name = indicator.name();
        let series = indicator.compute(&self.data);
        self.indicators.insert(name.clone(), series);
        name
    }

    /// Value of a registered indicator at the cursor. `None` inside the
    /// warm-up window; `UnknownIndicator` if the name was never registered.
    pub fn indicator(&self, name: &str) -> Result<Option<f64>, BacksimError> {
        let series = self
            .indicators
            .get(name)
            .ok_or_else(|| BacksimError::UnknownIndicator { name: name.into() })?;
        Ok(series.value_at(self.cursor))
    }

    /// Buy at the current bar's close. No-op when the cursor is out of
    /// range or the order is unaffordable.
    pub fn buy(&mut self, size: OrderSize) -> Result<(), BacksimError> {
        let (Some(price), Some(date)) = (self.data.close(self.cursor), self.data.date(self.cursor))
        else {
            return Ok(());
        };
        self.broker.buy(price, size, date)
    }

    /// Sell at the current bar's close. No-op when the cursor is out of
    /// range or the position cannot cover the order.
    pub fn sell(&mut self, size: OrderSize) -> Result<(), BacksimError> {
        let (Some(price), Some(date)) = (self.data.close(self.cursor), self.data.date(self.cursor))
        else {
            return Ok(());
        };
        self.broker.sell(price, size, date)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn set_cursor(&mut self, index: usize) {
        self.cursor = index;
    }

    /// Close price at the cursor, if in range.
    pub fn close(&self) -> Option<f64> {
        self.data.close(self.cursor)
    }

    pub fn position(&self) -> u64 {
        self.broker.position()
    }

    pub fn cash(&self) -> f64 {
        self.broker.cash()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &PriceSeries {
        &self.data
    }

    pub fn broker(&self) -> &Broker {
        &self.broker
    }

    pub(crate) fn into_broker(self) -> Broker {
        self.broker
    }
}

/// Decision policy invoked by the backtest engine.
pub trait Strategy {
    /// Called once before the first step. Register indicators here.
    fn initialize(&mut self, ctx: &mut SimContext) -> Result<(), BacksimError>;

    /// Called once per bar with the cursor already positioned. May place
    /// zero or more orders through the context.
    fn on_step(&mut self, ctx: &mut SimContext) -> Result<(), BacksimError>;
}

/// Buy-and-hold: spend all cash on the first bar and never trade again.
#[derive(Debug, Default)]
pub struct BuyAndHold;

impl Strategy for BuyAndHold {
    fn initialize(&mut self, _ctx: &mut SimContext) -> Result<(), BacksimError> {
        Ok(())
    }

    fn on_step(&mut self, ctx: &mut SimContext) -> Result<(), BacksimError> {
        if ctx.cursor() == 0 {
            ctx.buy(OrderSize::Max)?;
        }
        Ok(())
    }
}

/// Golden-cross trend following: long while the short SMA is above the
/// long SMA, flat otherwise.
#[derive(Debug)]
pub struct SmaCrossover {
    short_name: String,
    long_name: String,
    short: usize,
    long: usize,
}

impl SmaCrossover {
    pub fn new(short: usize, long: usize) -> Self {
        SmaCrossover {
            short_name: String::new(),
            long_name: String::new(),
            short,
            long,
        }
    }
}

impl Strategy for SmaCrossover {
    fn initialize(&mut self, ctx: &mut SimContext) -> Result<(), BacksimError> {
        self.short_name = ctx.register_indicator(&super::indicator::sma::Sma::new(self.short));
        self.long_name = ctx.register_indicator(&super::indicator::sma::Sma::new(self.long));
        Ok(())
    }

    fn on_step(&mut self, ctx: &mut SimContext) -> Result<(), BacksimError> {
        let short = ctx.indicator(&self.short_name)?;
        let long = ctx.indicator(&self.long_name)?;

        if let (Some(short), Some(long)) = (short, long) {
            if short > long && ctx.position() == 0 {
                ctx.buy(OrderSize::Max)?;
            } else if short < long && ctx.position() > 0 {
                ctx.sell(OrderSize::Max)?;
            }
        }
        Ok(())
    }
}

/// RSI mean reversion: buy when oversold, sell when overbought.
#[derive(Debug)]
pub struct RsiMeanReversion {
    rsi_name: String,
    period: usize,
    pub lower: f64,
    pub upper: f64,
}

impl RsiMeanReversion {
    pub fn new(period: usize, lower: f64, upper: f64) -> Self {
        RsiMeanReversion {
            rsi_name: String::new(),
            period,
            lower,
            upper,
        }
    }
}

impl Strategy for RsiMeanReversion {
    fn initialize(&mut self, ctx: &mut SimContext) -> Result<(), BacksimError> {
        self.rsi_name = ctx.register_indicator(&super::indicator::rsi::Rsi::new(self.period));
        Ok(())
    }

    fn on_step(&mut self, ctx: &mut SimContext) -> Result<(), BacksimError> {
        if let Some(rsi) = ctx.indicator(&self.rsi_name)? {
            if rsi < self.lower && ctx.position() == 0 {
                ctx.buy(OrderSize::Max)?;
            } else if rsi > self.upper && ctx.position() > 0 {
                ctx.sell(OrderSize::Max)?;
            }
        }
        Ok(())
    }
}
