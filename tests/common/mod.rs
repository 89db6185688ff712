#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::path::{Path, PathBuf};
pub use stockbot::domain::ohlcv::{OhlcvRecord, OhlcvSeries};
use stockbot::domain::error::StockbotError;
use stockbot::ports::data_port::DataPort;

pub const CSV_HEADER: &str = "Date,Open,High,Low,Close,Adj Close,Volume";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_record(date: NaiveDate, open: f64, close: f64) -> OhlcvRecord {
    OhlcvRecord {
        date,
        open,
        high: open.max(close),
        low: open.min(close),
        close,
        adj_close: close,
        volume: 1_000.0,
    }
}

/// Consecutive calendar days from 2020-01-02 with open == close.
pub fn series_from_prices(prices: &[f64]) -> OhlcvSeries {
    let start = date(2020, 1, 2);
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| make_record(start + Duration::days(i as i64), p, p))
        .collect::<Vec<_>>()
        .into()
}

/// 10.0, 10.1, ..., 11.9
pub fn rising_prices() -> Vec<f64> {
    (0..20).map(|i| (100 + i) as f64 / 10.0).collect()
}

pub fn csv_text(series: &OhlcvSeries) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for r in series.records() {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            r.date.format("%m/%d/%Y"),
            r.open,
            r.high,
            r.low,
            r.close,
            r.adj_close,
            r.volume
        ));
    }
    out
}

pub fn write_series_csv(dir: &Path, name: &str, series: &OhlcvSeries) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, csv_text(series)).unwrap();
    path
}

pub struct MockDataPort {
    pub series: Option<OhlcvSeries>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn with_series(series: OhlcvSeries) -> Self {
        Self {
            series: Some(series),
            error: None,
        }
    }

    pub fn with_error(reason: &str) -> Self {
        Self {
            series: None,
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self) -> Result<OhlcvSeries, StockbotError> {
        if let Some(reason) = &self.error {
            return Err(StockbotError::Csv {
                reason: reason.clone(),
            });
        }
        Ok(self.series.clone().unwrap_or_default())
    }
}
