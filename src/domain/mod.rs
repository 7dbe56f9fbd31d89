//! Core domain types and logic.

pub mod bar;
pub mod broker;
pub mod indicator;
pub mod strategy;
pub mod backtest;
pub mod analytics;
pub mod error;
