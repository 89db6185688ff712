//! CSV file data adapter.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::error::StockbotError;
use crate::domain::loader::load_series;
use crate::domain::ohlcv::OhlcvSeries;
use crate::ports::data_port::DataPort;

/// Reads a daily price history from one CSV file.
pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self) -> Result<OhlcvSeries, StockbotError> {
        let file = File::open(&self.path).map_err(|e| {
            StockbotError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read {}: {}", self.path.display(), e),
            ))
        })?;
        let series = load_series(BufReader::new(file))?;
        info!(path = %self.path.display(), records = series.len(), "loaded price history");
        Ok(series)
    }
}
