//! Technical indicators derived from the open-price column.
//!
//! Every series produced here has exactly one value per record of the
//! [`OhlcvSeries`] it came from, so `values[i]` and `series.records()[i]`
//! always describe the same trading day.

pub mod rsi;
pub mod sma;

use std::fmt;

use crate::domain::ohlcv::OhlcvSeries;

pub const MA_PERIOD: usize = 14;
pub const RSI_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<f64>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}

/// The moving-average and RSI series the strategies consume.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicators {
    pub ma: IndicatorSeries,
    pub rsi: IndicatorSeries,
}

impl Indicators {
    pub fn compute(series: &OhlcvSeries) -> Self {
        Self {
            ma: sma::calculate_sma(series, MA_PERIOD),
            rsi: rsi::calculate_rsi(series, RSI_PERIOD),
        }
    }
}
