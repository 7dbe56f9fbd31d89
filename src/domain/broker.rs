//! Order execution and portfolio accounting.
//!
//! The broker owns the only mutable state in a simulation: cash, the share
//! position, and the trade log. Orders execute immediately at the supplied
//! price adjusted for slippage and commission. Two invariants hold after
//! every call: cash never goes negative and the position is unsigned.
//!
//! Failing to afford a buy or to hold enough shares for a sell is an
//! ordinary simulation outcome, not an error: such orders are silent
//! no-ops, never partial fills. Only malformed prices are rejected with
//! [`BacksimError::InvalidOrder`].

use chrono::NaiveDate;

use super::error::BacksimError;

/// Requested order quantity.
///
/// `Max` is the default-sizing branch: spend all cash on a buy, flatten the
/// whole position on a sell. Modeled as an explicit variant so the sizing
/// path is a testable code path rather than an absent parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSize {
    Exact(u64),
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    Sell,
}

/// One executed trade, appended to the broker's log on success only.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub action: TradeAction,
    pub price: f64,
    pub amount: u64,
    pub date: NaiveDate,
}

/// Read-only view of the broker's holdings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Holdings {
    pub cash: f64,
    pub position: u64,
}

#[derive(Debug, Clone)]
pub struct Broker {
    cash: f64,
    position: u64,
    commission_rate: f64,
    slippage: f64,
    trades: Vec<Trade>,
}

impl Broker {
    pub fn new(initial_cash: f64, commission_rate: f64, slippage: f64) -> Self {
        Broker {
            cash: initial_cash,
            position: 0,
            commission_rate,
            slippage,
            trades: Vec::new(),
        }
    }

    /// Execute a buy at `price` plus slippage.
    ///
    /// `OrderSize::Max` buys the largest whole-share quantity the current
    /// cash affords; if that is zero the call does nothing. An explicit
    /// amount the cash cannot cover also does nothing — the order is
    /// dropped, not clipped to the affordable size.
    pub fn buy(
        &mut self,
        price: f64,
        size: OrderSize,
        date: NaiveDate,
    ) -> Result<(), BacksimError> {
        validate_price(price)?;

        let executed = price + self.slippage;
        let unit_cost = executed * (1.0 + self.commission_rate);

        let amount = match size {
            OrderSize::Exact(n) => n,
            OrderSize::Max => {
                if unit_cost <= 0.0 {
                    return Ok(());
                }
                (self.cash / unit_cost).floor() as u64
            }
        };

        if amount == 0 {
            return Ok(());
        }

        let cost = unit_cost * amount as f64;
        if cost > self.cash {
            return Ok(());
        }

        self.cash -= cost;
        self.position += amount;
        self.trades.push(Trade {
            action: TradeAction::Buy,
            price: executed,
            amount,
            date,
        });

        Ok(())
    }

    /// Execute a sell at `price` minus slippage.
    ///
    /// `OrderSize::Max` sells the entire position; with nothing held the
    /// call does nothing. Selling more than held does nothing.
    pub fn sell(
        &mut self,
        price: f64,
        size: OrderSize,
        date: NaiveDate,
    ) -> Result<(), BacksimError> {
        validate_price(price)?;

        // Slippage never drives the execution price below zero.
        let executed = (price - self.slippage).max(0.0);
        let unit_revenue = executed * (1.0 - self.commission_rate);

        let amount = match size {
            OrderSize::Exact(n) => n,
            OrderSize::Max => self.position,
        };

        if amount == 0 || amount > self.position {
            return Ok(());
        }

        self.cash += unit_revenue * amount as f64;
        self.position -= amount;
        self.trades.push(Trade {
            action: TradeAction::Sell,
            price: executed,
            amount,
            date,
        });

        Ok(())
    }

    /// Cash plus position valued at `current_price`. Pure.
    pub fn portfolio_value(&self, current_price: f64) -> f64 {
        self.cash + self.position as f64 * current_price
    }

    pub fn holdings(&self) -> Holdings {
        Holdings {
            cash: self.cash,
            position: self.position,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }
}

fn validate_price(price: f64) -> Result<(), BacksimError> {
    if !price.is_finite() || price < 0.0 {
        return Err(BacksimError::InvalidOrder {
            reason: format!("invalid price {price}"),
        });
    }
    Ok(())
}
