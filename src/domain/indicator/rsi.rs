//! RSI (Relative Strength Index) over the open price.
//!
//! Simple-average variant, no Wilder smoothing:
//! - change[0] = 0, change[i] = price[i] - price[i-1]
//! - up/down moves are the positive/negative parts of each change
//! - rsi[i] averages the moves over change[max(0, i - period + 1)..=i]
//! - RS = avg_up / avg_down, with RS = 0 when avg_down == 0
//! - RSI = 100 when RS == 0, else 100 - 100 / (1 + RS)
//!
//! The RS == 0 rule means a window with no down-moves reads 100, and so does
//! a window with only down-moves (avg_up == 0). Output is always in [0, 100]
//! and has one value per input price.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvSeries;

/// Day-over-day changes, with a zero change for the first day.
fn price_changes(prices: &[f64]) -> Vec<f64> {
    let mut changes = Vec::with_capacity(prices.len());
    if !prices.is_empty() {
        changes.push(0.0);
    }
    changes.extend(prices.windows(2).map(|w| w[1] - w[0]));
    changes
}

fn rsi_from_rs(rs: f64) -> f64 {
    if rs == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + rs)
    }
}

pub fn rsi_values(prices: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1);
    let changes = price_changes(prices);
    let ups: Vec<f64> = changes.iter().map(|c| c.max(0.0)).collect();
    let downs: Vec<f64> = changes.iter().map(|c| (-c).max(0.0)).collect();

    (0..changes.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(period);
            let count = (i + 1 - start) as f64;
            let avg_up = ups[start..=i].iter().sum::<f64>() / count;
            let avg_down = downs[start..=i].iter().sum::<f64>() / count;
            let rs = if avg_down == 0.0 { 0.0 } else { avg_up / avg_down };
            rsi_from_rs(rs)
        })
        .collect()
}

pub fn calculate_rsi(series: &OhlcvSeries, period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values: rsi_values(&series.opens(), period),
    }
}
