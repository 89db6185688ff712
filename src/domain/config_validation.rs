//! Configuration validation.
//!
//! Checks the optional INI settings before anything is loaded, so a typo in
//! the config fails fast instead of after a long input file is parsed.

use crate::domain::error::StockbotError;
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StockbotError> {
    validate_initial_balance(config)?;
    validate_strategy(config)?;
    Ok(())
}

/// Parse a starting balance; it must be a finite number above zero.
pub fn parse_balance(raw: &str, section: &str, key: &str) -> Result<f64, StockbotError> {
    let invalid = |reason: &str| StockbotError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("initial_balance must be a number"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid("initial_balance must be positive"));
    }
    Ok(value)
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), StockbotError> {
    if let Some(raw) = config.get_trimmed("backtest", "initial_balance") {
        parse_balance(&raw, "backtest", "initial_balance")?;
    }
    Ok(())
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), StockbotError> {
    if let Some(raw) = config.get_trimmed("backtest", "strategy") {
        raw.parse::<StrategyKind>()
            .map_err(|reason| StockbotError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "strategy".to_string(),
                reason,
            })?;
    }
    Ok(())
}
