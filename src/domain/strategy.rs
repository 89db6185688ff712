//! The three built-in strategies and their fixed parameters.

use std::fmt;
use std::str::FromStr;

/// Exclusive lower bound of the neutral RSI band.
pub const RSI_OVERSOLD: f64 = 30.0;
/// Exclusive upper bound of the neutral band; RSI strictly above it is overbought.
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// Net worth multiple of the starting balance that arms the stop condition.
pub const STOP_MULTIPLE: f64 = 2.0;
/// Number of yearly anniversaries the long game observes.
pub const CHECKPOINT_YEARS: usize = 4;
/// Calendar-day tolerance around each anniversary.
pub const CHECKPOINT_WINDOW_DAYS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum StrategyKind {
    /// Buy everything on day one and hold.
    LongGame,
    /// Partial buys and sells on RSI/MA signals.
    RsiMa,
    /// All-in buys on dips or neutral RSI, full exits on breakouts.
    Breakout,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::LongGame,
        StrategyKind::RsiMa,
        StrategyKind::Breakout,
    ];

    /// Short identifier used in config files and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            StrategyKind::LongGame => "long-game",
            StrategyKind::RsiMa => "rsi-ma",
            StrategyKind::Breakout => "breakout",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StrategyKind::LongGame => "Algorithm 1: Long Game",
            StrategyKind::RsiMa => "Algorithm 2: RSI & MA Method",
            StrategyKind::Breakout => "Algorithm 3: Using Module",
        }
    }

    /// File name of the activity log written for a run of this strategy.
    pub fn activity_log_name(&self) -> &'static str {
        match self {
            StrategyKind::LongGame => "Activity_log_Algorithm_1_TheLongGame.csv",
            StrategyKind::RsiMa => "Activity_log_Algorithm_2_RSI_MA_Method.csv",
            StrategyKind::Breakout => "Activity_log_Algorithm_3_UsingModule.csv",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "long-game" | "1" => Ok(StrategyKind::LongGame),
            "rsi-ma" | "2" => Ok(StrategyKind::RsiMa),
            "breakout" | "3" => Ok(StrategyKind::Breakout),
            _ => Err(format!(
                "unknown strategy {:?} (expected long-game, rsi-ma or breakout)",
                s
            )),
        }
    }
}
