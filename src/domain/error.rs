//! Domain error types.

/// Top-level error type for stockbot.
#[derive(Debug, thiserror::Error)]
pub enum StockbotError {
    #[error("row {row}: could not parse date {value:?}")]
    DateParse { row: usize, value: String },

    #[error("row {row}: invalid {column} value {value:?}")]
    Format {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("no price data loaded")]
    EmptyData,

    #[error("{indicator} has {found} values for {expected} records")]
    Misaligned {
        indicator: String,
        expected: usize,
        found: usize,
    },

    #[error("CSV error: {reason}")]
    Csv { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for StockbotError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            if let csv::ErrorKind::Io(io) = err.into_kind() {
                return StockbotError::Io(io);
            }
            return StockbotError::Csv {
                reason: "I/O failure".into(),
            };
        }
        StockbotError::Csv {
            reason: err.to_string(),
        }
    }
}

impl From<&StockbotError> for std::process::ExitCode {
    fn from(err: &StockbotError) -> Self {
        let code: u8 = match err {
            StockbotError::Io(_) => 1,
            StockbotError::ConfigParse { .. } | StockbotError::ConfigInvalid { .. } => 2,
            StockbotError::DateParse { .. }
            | StockbotError::Format { .. }
            | StockbotError::Csv { .. } => 3,
            StockbotError::EmptyData | StockbotError::Misaligned { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
