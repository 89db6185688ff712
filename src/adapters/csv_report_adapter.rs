//! CSV writers for the indicator export and strategy activity logs.
//!
//! Indicator export:
//! ```text
//! Date,RSI values,Open price,Moving Average
//! 2024-01-15,100.0,100.0,100.0
//! ```
//! RSI and MA are rounded to 2 decimals; the open price is written as loaded.
//!
//! Activity log (one file per strategy run):
//! ```text
//! Date,Networth
//! 01/15/2024,10000.0
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StockbotError;
use crate::domain::indicator::Indicators;
use crate::domain::loader::parse_date;
use crate::domain::ohlcv::OhlcvSeries;
use crate::domain::rounding::round2;
use crate::ports::report_port::ReportPort;

pub const INDICATOR_HEADER: [&str; 4] = ["Date", "RSI values", "Open price", "Moving Average"];
pub const ACTIVITY_HEADER: [&str; 2] = ["Date", "Networth"];
pub const ACTIVITY_DATE_FORMAT: &str = "%m/%d/%Y";

/// Decimal text that always shows a fractional part (`100.0`, `66.67`).
fn fmt_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

pub fn write_indicator_csv<W: Write>(
    writer: W,
    series: &OhlcvSeries,
    indicators: &Indicators,
) -> Result<(), StockbotError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(INDICATOR_HEADER)?;

    for (i, record) in series.records().iter().enumerate() {
        let rsi = indicators.rsi.get(i).map(round2).unwrap_or_default();
        let ma = indicators.ma.get(i).map(round2).unwrap_or_default();
        wtr.write_record([
            record.date.to_string(),
            fmt_decimal(rsi),
            fmt_decimal(record.open),
            fmt_decimal(ma),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_activity_csv<W: Write>(writer: W, result: &BacktestResult) -> Result<(), StockbotError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(ACTIVITY_HEADER)?;

    for point in &result.trajectory.points {
        wtr.write_record([
            point.date.format(ACTIVITY_DATE_FORMAT).to_string(),
            fmt_decimal(round2(point.net_worth)),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// One row of a previously written indicator export.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub rsi: f64,
    pub open: f64,
    pub ma: f64,
}

/// Read back an indicator export written by [`write_indicator_csv`].
pub fn read_indicator_csv<R: Read>(reader: R) -> Result<Vec<IndicatorRow>, StockbotError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 2;
        let field = |idx: usize, column: &'static str| -> Result<f64, StockbotError> {
            let raw = record.get(idx).unwrap_or_default();
            raw.trim().parse().map_err(|_| StockbotError::Format {
                row,
                column,
                value: raw.to_string(),
            })
        };

        let date_str = record.get(0).unwrap_or_default();
        let date = parse_date(date_str).ok_or_else(|| StockbotError::DateParse {
            row,
            value: date_str.to_string(),
        })?;

        rows.push(IndicatorRow {
            date,
            rsi: field(1, "rsi")?,
            open: field(2, "open")?,
            ma: field(3, "moving_average")?,
        });
    }
    Ok(rows)
}

/// Writes reports as CSV files; activity logs land in `log_dir`.
pub struct CsvReportAdapter {
    log_dir: PathBuf,
}

impl CsvReportAdapter {
    pub fn new<P: Into<PathBuf>>(log_dir: P) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn activity_log_path(&self, result: &BacktestResult) -> PathBuf {
        self.log_dir.join(result.strategy.activity_log_name())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_indicators(
        &self,
        series: &OhlcvSeries,
        indicators: &Indicators,
        output_path: &Path,
    ) -> Result<(), StockbotError> {
        let file = File::create(output_path)?;
        write_indicator_csv(file, series, indicators)?;
        info!(path = %output_path.display(), rows = series.len(), "indicator export written");
        Ok(())
    }

    fn write_activity_log(&self, result: &BacktestResult) -> Result<PathBuf, StockbotError> {
        fs::create_dir_all(&self.log_dir)?;
        let path = self.activity_log_path(result);
        let file = File::create(&path)?;
        write_activity_csv(file, result)?;
        info!(path = %path.display(), rows = result.trajectory.len(), "activity log written");
        Ok(path)
    }
}
