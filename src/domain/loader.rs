//! Parses raw CSV rows into an [`OhlcvSeries`].
//!
//! Row layout: `date,open,high,low,close,adj_close,volume`. The first row is
//! always a header and is never parsed. Rows are taken in file order; the
//! loader does not sort, it only warns when a date goes backwards.

use std::io::Read;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::error::StockbotError;
use crate::domain::ohlcv::{OhlcvRecord, OhlcvSeries};

/// Accepted date layouts, tried in order; the first that parses wins.
pub const DATE_FORMATS: [&str; 4] = ["%-m/%d/%Y", "%m/%d/%Y", "%-m/%-d/%Y", "%Y-%m-%d"];

const NUMERIC_COLUMNS: [&str; 6] = ["open", "high", "low", "close", "adj_close", "volume"];

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

fn parse_number(record: &csv::StringRecord, idx: usize, row: usize) -> Result<f64, StockbotError> {
    let column = NUMERIC_COLUMNS[idx - 1];
    let raw = record.get(idx).ok_or_else(|| StockbotError::Format {
        row,
        column,
        value: String::new(),
    })?;
    let invalid = || StockbotError::Format {
        row,
        column,
        value: raw.to_string(),
    };
    let value = raw.trim().parse::<f64>().map_err(|_| invalid())?;
    // prices and volume are finite, non-negative decimals
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok(value)
}

/// Read every data row from `reader`. Any unparseable date or number aborts
/// the whole load; there is no row skipping.
pub fn load_series<R: Read>(reader: R) -> Result<OhlcvSeries, StockbotError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        // header is line 1
        let row = i + 2;

        let date_str = record.get(0).unwrap_or_default();
        let date = parse_date(date_str).ok_or_else(|| StockbotError::DateParse {
            row,
            value: date_str.to_string(),
        })?;

        let rec = OhlcvRecord {
            date,
            open: parse_number(&record, 1, row)?,
            high: parse_number(&record, 2, row)?,
            low: parse_number(&record, 3, row)?,
            close: parse_number(&record, 4, row)?,
            adj_close: parse_number(&record, 5, row)?,
            volume: parse_number(&record, 6, row)?,
        };

        if let Some(prev) = records.last().map(|r: &OhlcvRecord| r.date) {
            if rec.date < prev {
                warn!(row, date = %rec.date, previous = %prev, "date precedes previous row");
            }
        }
        records.push(rec);
    }

    debug!(rows = records.len(), "parsed price rows");
    Ok(OhlcvSeries::new(records))
}
