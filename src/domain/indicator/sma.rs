//! Simple moving average with a shrinking window at the start of the series.
//!
//! For index `i` the average covers `values[max(0, i - period + 1)..=i]`, so
//! the first `period - 1` outputs average whatever history exists instead of
//! being undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvSeries;

/// Trailing average of `values`, one output per input.
pub fn moving_average(values: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1);
    (0..values.len())
        .map(|i| {
            let window = &values[(i + 1).saturating_sub(period)..=i];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

/// Moving average of the open price.
pub fn calculate_sma(series: &OhlcvSeries, period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values: moving_average(&series.opens(), period),
    }
}
