//! Output port for the indicator export and per-run activity logs.

use std::path::{Path, PathBuf};

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StockbotError;
use crate::domain::indicator::Indicators;
use crate::domain::ohlcv::OhlcvSeries;

pub trait ReportPort {
    /// Write one row per trading day: date, RSI, open, moving average.
    fn write_indicators(
        &self,
        series: &OhlcvSeries,
        indicators: &Indicators,
        output_path: &Path,
    ) -> Result<(), StockbotError>;

    /// Persist a run's net-worth trajectory. Returns where it was written.
    fn write_activity_log(&self, result: &BacktestResult) -> Result<PathBuf, StockbotError>;
}
