//! Price data source port trait.

use crate::domain::error::StockbotError;
use crate::domain::ohlcv::OhlcvSeries;
use chrono::NaiveDate;

pub trait DataPort {
    fn fetch_series(&self) -> Result<OhlcvSeries, StockbotError>;

    /// First date, last date and record count, or `None` for an empty source.
    fn get_data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, StockbotError> {
        let series = self.fetch_series()?;
        Ok(match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => Some((first, last, series.len())),
            _ => None,
        })
    }
}
