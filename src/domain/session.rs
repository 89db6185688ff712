//! A loaded dataset plus the balance strategies start from.
//!
//! This is what a presentation layer talks to: it exposes the series length,
//! first/last date, the open/MA/RSI columns, a balance setter, and one entry
//! point per strategy. Runs borrow the session immutably and hand back a
//! fresh [`BacktestResult`]; nothing from a previous run is kept.

use chrono::NaiveDate;

use crate::domain::backtest::{self, BacktestConfig, BacktestResult};
use crate::domain::error::StockbotError;
use crate::domain::indicator::Indicators;
use crate::domain::ohlcv::OhlcvSeries;
use crate::domain::strategy::StrategyKind;

#[derive(Debug, Clone)]
pub struct Session {
    series: OhlcvSeries,
    indicators: Indicators,
    config: BacktestConfig,
}

impl Session {
    /// Compute indicators for `series` and start from the default balance.
    pub fn new(series: OhlcvSeries) -> Self {
        let indicators = Indicators::compute(&series);
        Session {
            series,
            indicators,
            config: BacktestConfig::default(),
        }
    }

    pub fn with_balance(mut self, balance: f64) -> Self {
        self.set_balance(balance);
        self
    }

    pub fn set_balance(&mut self, balance: f64) {
        self.config.initial_balance = balance;
    }

    pub fn balance(&self) -> f64 {
        self.config.initial_balance
    }

    pub fn series(&self) -> &OhlcvSeries {
        &self.series
    }

    pub fn indicators(&self) -> &Indicators {
        &self.indicators
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.series.first_date()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.series.last_date()
    }

    pub fn open_prices(&self) -> Vec<f64> {
        self.series.opens()
    }

    pub fn ma_values(&self) -> &[f64] {
        &self.indicators.ma.values
    }

    pub fn rsi_values(&self) -> &[f64] {
        &self.indicators.rsi.values
    }

    pub fn run(&self, kind: StrategyKind) -> Result<BacktestResult, StockbotError> {
        backtest::run(kind, &self.series, &self.indicators, &self.config)
    }

    pub fn run_long_game(&self) -> Result<BacktestResult, StockbotError> {
        self.run(StrategyKind::LongGame)
    }

    pub fn run_rsi_ma(&self) -> Result<BacktestResult, StockbotError> {
        self.run(StrategyKind::RsiMa)
    }

    pub fn run_breakout(&self) -> Result<BacktestResult, StockbotError> {
        self.run(StrategyKind::Breakout)
    }
}
