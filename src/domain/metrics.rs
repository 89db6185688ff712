//! Run summary: profit/loss, return and drawdown of one backtest.

use super::backtest::BacktestResult;
use super::portfolio::EquityPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub initial_balance: f64,
    pub final_worth: f64,
    pub profit_loss: f64,
    /// Profit/loss as a percentage of the starting balance.
    pub return_pct: f64,
    /// Largest peak-to-trough fall as a fraction of the peak.
    pub max_drawdown: f64,
    /// Longest run of days spent below a previous peak.
    pub max_drawdown_duration: usize,
    pub trades: usize,
}

impl Summary {
    pub fn compute(result: &BacktestResult) -> Self {
        let initial_balance = result.initial_balance;
        let profit_loss = result.final_worth - initial_balance;
        let return_pct = if initial_balance > 0.0 {
            profit_loss / initial_balance * 100.0
        } else {
            0.0
        };
        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&result.trajectory.points);

        Summary {
            initial_balance,
            final_worth: result.final_worth,
            profit_loss,
            return_pct,
            max_drawdown,
            max_drawdown_duration,
            trades: result.trades,
        }
    }
}

fn compute_drawdown(curve: &[EquityPoint]) -> (f64, usize) {
    let Some(first) = curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.net_worth;
    let mut max_dd = 0.0_f64;
    let mut max_duration = 0usize;
    let mut duration = 0usize;

    for point in curve {
        if point.net_worth >= peak {
            peak = point.net_worth;
            duration = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.net_worth) / peak);
            duration += 1;
            max_duration = max_duration.max(duration);
        }
    }

    (max_dd, max_duration)
}
