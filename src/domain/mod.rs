//! Core domain types and logic.

pub mod ohlcv;
pub mod loader;
pub mod indicator;
pub mod portfolio;
pub mod execution;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod session;
pub mod rounding;
pub mod config_validation;
pub mod error;
