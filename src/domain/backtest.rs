//! Backtest engine: replays one strategy over a loaded series.
//!
//! Every run is a pure function of (series, indicators, starting balance).
//! The day loop owns a [`RunState`] for the duration of the run; nothing is
//! shared between runs. Each day the strategy may trade at the open, then
//! the portfolio is marked to the close and appended to the trajectory.
//!
//! The RSI/MA and breakout strategies share a stop rule: once net worth
//! reaches [`STOP_MULTIPLE`] times the starting balance and the RSI is not
//! still rising over the last three days, trading stops for good. Net worth
//! keeps being marked daily after that.

use chrono::{Datelike, Months, NaiveDate};
use tracing::{debug, info};

use crate::domain::error::StockbotError;
use crate::domain::execution::{self, TradeResult};
use crate::domain::indicator::{IndicatorSeries, Indicators};
use crate::domain::ohlcv::{OhlcvRecord, OhlcvSeries};
use crate::domain::portfolio::{PerformanceTrajectory, Portfolio};
use crate::domain::strategy::{
    CHECKPOINT_WINDOW_DAYS, CHECKPOINT_YEARS, RSI_OVERBOUGHT, RSI_OVERSOLD, STOP_MULTIPLE,
    StrategyKind,
};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_balance: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_balance: 10_000.0,
        }
    }
}

/// Open price observed near a yearly anniversary of the first trading day.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub anniversary: NaiveDate,
    pub observed: Option<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy: StrategyKind,
    pub initial_balance: f64,
    pub trajectory: PerformanceTrajectory,
    pub final_worth: f64,
    pub final_cash: f64,
    pub final_shares: u64,
    pub trades: usize,
    /// Date trading stopped, for strategies with a stop rule.
    pub stopped_on: Option<NaiveDate>,
    /// Anniversary observations (long game only).
    pub checkpoints: Vec<Checkpoint>,
}

/// Mutable state of a single run.
#[derive(Debug)]
struct RunState {
    portfolio: Portfolio,
    stopped: bool,
    last_buy_price: f64,
    trades: usize,
}

impl RunState {
    fn new(initial_balance: f64) -> Self {
        RunState {
            portfolio: Portfolio::new(initial_balance),
            stopped: false,
            last_buy_price: 0.0,
            trades: 0,
        }
    }

    fn apply(&mut self, result: TradeResult, date: NaiveDate) {
        if let TradeResult::Filled {
            side,
            quantity,
            price,
        } = result
        {
            self.trades += 1;
            debug!(%date, ?side, quantity, price, cash = self.portfolio.cash, "fill");
        }
    }
}

/// Inputs visible to a strategy on one day.
struct Day<'a> {
    index: usize,
    record: &'a OhlcvRecord,
    ma: f64,
    rsi: f64,
    prev_rsi: Option<f64>,
}

fn check_inputs(series: &OhlcvSeries, indicators: &Indicators) -> Result<(), StockbotError> {
    if series.is_empty() {
        return Err(StockbotError::EmptyData);
    }
    for ind in [&indicators.ma, &indicators.rsi] {
        check_aligned(series, ind)?;
    }
    Ok(())
}

fn check_aligned(series: &OhlcvSeries, ind: &IndicatorSeries) -> Result<(), StockbotError> {
    if ind.len() != series.len() {
        return Err(StockbotError::Misaligned {
            indicator: ind.indicator_type.to_string(),
            expected: series.len(),
            found: ind.len(),
        });
    }
    Ok(())
}

/// True once worth has doubled and RSI is no longer rising two days running.
fn should_stop(net_worth: f64, initial_balance: f64, rsi: &[f64], i: usize) -> bool {
    if net_worth < initial_balance * STOP_MULTIPLE || i < 2 {
        return false;
    }
    let still_rising = rsi[i] > rsi[i - 1] && rsi[i - 1] > rsi[i - 2];
    !still_rising
}

/// Shared day loop. `decide` runs before the close is marked, and only while
/// the run has not stopped.
fn simulate<F>(
    kind: StrategyKind,
    series: &OhlcvSeries,
    indicators: &Indicators,
    config: &BacktestConfig,
    mut state: RunState,
    stop_rule: bool,
    mut decide: F,
) -> BacktestResult
where
    F: FnMut(&mut RunState, &Day<'_>),
{
    let records = series.records();
    let rsi = &indicators.rsi.values;
    let mut trajectory = PerformanceTrajectory::with_capacity(records.len());
    let mut stopped_on = None;

    for (i, record) in records.iter().enumerate() {
        if !state.stopped {
            let day = Day {
                index: i,
                record,
                ma: indicators.ma.values[i],
                rsi: rsi[i],
                prev_rsi: i.checked_sub(1).map(|p| rsi[p]),
            };
            decide(&mut state, &day);
        }

        let worth = trajectory.record(record.date, &state.portfolio, record.close);

        if stop_rule && !state.stopped && should_stop(worth, config.initial_balance, rsi, i) {
            state.stopped = true;
            stopped_on = Some(record.date);
            info!(strategy = kind.key(), date = %record.date, worth, "target reached, trading stopped");
        }
    }

    let last_close = records.last().map(|r| r.close).unwrap_or_default();
    let final_worth = state.portfolio.net_worth(last_close);
    info!(strategy = kind.key(), final_worth, trades = state.trades, "backtest complete");

    BacktestResult {
        strategy: kind,
        initial_balance: config.initial_balance,
        trajectory,
        final_worth,
        final_cash: state.portfolio.cash,
        final_shares: state.portfolio.shares,
        trades: state.trades,
        stopped_on,
        checkpoints: Vec::new(),
    }
}

/// Same year, same month, and at most three calendar days apart.
pub fn within_checkpoint_window(anniversary: NaiveDate, date: NaiveDate) -> bool {
    anniversary.year() == date.year()
        && anniversary.month() == date.month()
        && anniversary.day().abs_diff(date.day()) <= CHECKPOINT_WINDOW_DAYS
}

fn anniversaries(start: NaiveDate) -> Vec<NaiveDate> {
    (1..=CHECKPOINT_YEARS as u32)
        .filter_map(|years| start.checked_add_months(Months::new(12 * years)))
        .collect()
}

/// Buy as many shares as the balance affords on day 0 and never sell.
/// Open prices near each of the next four anniversaries are recorded.
pub fn run_long_game(
    series: &OhlcvSeries,
    indicators: &Indicators,
    config: &BacktestConfig,
) -> Result<BacktestResult, StockbotError> {
    check_inputs(series, indicators)?;
    let first = &series.records()[0];

    let mut state = RunState::new(config.initial_balance);
    let fill = execution::buy_max(&mut state.portfolio, first.open);
    state.apply(fill, first.date);

    let mut checkpoints: Vec<Checkpoint> = anniversaries(first.date)
        .into_iter()
        .map(|anniversary| Checkpoint {
            anniversary,
            observed: None,
        })
        .collect();

    let mut result = simulate(
        StrategyKind::LongGame,
        series,
        indicators,
        config,
        state,
        false,
        |_, day| {
            for cp in checkpoints.iter_mut().filter(|cp| cp.observed.is_none()) {
                if within_checkpoint_window(cp.anniversary, day.record.date) {
                    cp.observed = Some((day.record.date, day.record.open));
                    debug!(anniversary = %cp.anniversary, date = %day.record.date, open = day.record.open, "checkpoint");
                }
            }
        },
    );
    result.checkpoints = checkpoints;
    Ok(result)
}

/// Buy 30% of cash when RSI is neutral and price is above its MA; sell half
/// the position when RSI falls back under 70 and price is below its MA.
pub fn run_rsi_ma(
    series: &OhlcvSeries,
    indicators: &Indicators,
    config: &BacktestConfig,
) -> Result<BacktestResult, StockbotError> {
    check_inputs(series, indicators)?;
    let state = RunState::new(config.initial_balance);

    Ok(simulate(
        StrategyKind::RsiMa,
        series,
        indicators,
        config,
        state,
        true,
        |state, day| {
            let open = day.record.open;
            let buy_signal = day.rsi > RSI_OVERSOLD && day.rsi < RSI_OVERBOUGHT && day.ma < open;
            let crossed_down = day.prev_rsi.is_some_and(|prev| prev > RSI_OVERBOUGHT);
            let sell_signal = day.rsi < RSI_OVERBOUGHT && crossed_down && day.ma > open;

            if buy_signal {
                if state.portfolio.cash > open {
                    let fill = execution::buy_partial(&mut state.portfolio, open);
                    state.apply(fill, day.record.date);
                }
            } else if sell_signal && state.portfolio.shares > 0 {
                let fill = execution::sell_partial(&mut state.portfolio, open);
                state.apply(fill, day.record.date);
            }
        },
    ))
}

/// Go all in on day 0. Afterwards add everything affordable when price dips
/// under the last buy or RSI is neutral; otherwise exit the whole position
/// when price breaks above the last buy or RSI is overbought.
pub fn run_breakout(
    series: &OhlcvSeries,
    indicators: &Indicators,
    config: &BacktestConfig,
) -> Result<BacktestResult, StockbotError> {
    check_inputs(series, indicators)?;
    let first = &series.records()[0];

    let mut state = RunState::new(config.initial_balance);
    let fill = execution::buy_max(&mut state.portfolio, first.open);
    state.apply(fill, first.date);
    state.last_buy_price = first.open;

    Ok(simulate(
        StrategyKind::Breakout,
        series,
        indicators,
        config,
        state,
        true,
        |state, day| {
            if day.index == 0 {
                return;
            }
            let open = day.record.open;
            let neutral = day.rsi > RSI_OVERSOLD && day.rsi < RSI_OVERBOUGHT;

            if open < state.last_buy_price || neutral {
                let fill = execution::buy_max(&mut state.portfolio, open);
                state.apply(fill, day.record.date);
                state.last_buy_price = open;
            } else if open > state.last_buy_price || day.rsi > RSI_OVERBOUGHT {
                let fill = execution::sell_all(&mut state.portfolio, open);
                state.apply(fill, day.record.date);
            }
        },
    ))
}

pub fn run(
    kind: StrategyKind,
    series: &OhlcvSeries,
    indicators: &Indicators,
    config: &BacktestConfig,
) -> Result<BacktestResult, StockbotError> {
    match kind {
        StrategyKind::LongGame => run_long_game(series, indicators, config),
        StrategyKind::RsiMa => run_rsi_ma(series, indicators, config),
        StrategyKind::Breakout => run_breakout(series, indicators, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::IndicatorType;
    use approx::assert_relative_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series_from(opens: &[f64], closes: &[f64]) -> OhlcvSeries {
        let start = ymd(2024, 1, 1);
        opens
            .iter()
            .zip(closes)
            .enumerate()
            .map(|(i, (&open, &close))| OhlcvRecord {
                date: start + chrono::Duration::days(i as i64),
                open,
                high: open.max(close),
                low: open.min(close),
                close,
                adj_close: close,
                volume: 1_000.0,
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// Indicators supplied directly, so signals can be scripted day by day.
    fn scripted(ma: Vec<f64>, rsi: Vec<f64>) -> Indicators {
        Indicators {
            ma: IndicatorSeries {
                indicator_type: IndicatorType::Sma(14),
                values: ma,
            },
            rsi: IndicatorSeries {
                indicator_type: IndicatorType::Rsi(14),
                values: rsi,
            },
        }
    }

    fn config(balance: f64) -> BacktestConfig {
        BacktestConfig {
            initial_balance: balance,
        }
    }

    #[test]
    fn empty_series_is_an_error_for_every_strategy() {
        let series = OhlcvSeries::default();
        let ind = Indicators::compute(&series);
        for kind in StrategyKind::ALL {
            let err = run(kind, &series, &ind, &config(1000.0)).unwrap_err();
            assert!(matches!(err, StockbotError::EmptyData));
        }
    }

    #[test]
    fn misaligned_indicators_are_rejected() {
        let series = series_from(&[10.0, 11.0], &[10.0, 11.0]);
        let ind = scripted(vec![10.0], vec![50.0, 50.0]);
        let err = run_rsi_ma(&series, &ind, &config(1000.0)).unwrap_err();
        assert!(matches!(err, StockbotError::Misaligned { expected: 2, found: 1, .. }));
    }

    #[test]
    fn stop_rule_requires_doubling() {
        let rsi = [50.0, 40.0, 30.0];
        assert!(!should_stop(1999.0, 1000.0, &rsi, 2));
        assert!(should_stop(2000.0, 1000.0, &rsi, 2));
    }

    #[test]
    fn stop_rule_waits_while_rsi_keeps_rising() {
        assert!(!should_stop(5000.0, 1000.0, &[10.0, 20.0, 30.0], 2));
        assert!(should_stop(5000.0, 1000.0, &[10.0, 20.0, 20.0], 2));
        assert!(!should_stop(5000.0, 1000.0, &[10.0, 20.0], 1));
    }

    #[test]
    fn checkpoint_window_needs_same_month() {
        let anniversary = ymd(2021, 3, 30);
        assert!(within_checkpoint_window(anniversary, ymd(2021, 3, 27)));
        assert!(within_checkpoint_window(anniversary, ymd(2021, 3, 31)));
        assert!(!within_checkpoint_window(anniversary, ymd(2021, 3, 26)));
        // two days away, but a different month
        assert!(!within_checkpoint_window(anniversary, ymd(2021, 4, 1)));
        assert!(!within_checkpoint_window(anniversary, ymd(2022, 3, 30)));
    }

    #[test]
    fn anniversaries_clamp_leap_day() {
        let dates = anniversaries(ymd(2020, 2, 29));
        assert_eq!(dates, vec![ymd(2021, 2, 28), ymd(2022, 2, 28), ymd(2023, 2, 28), ymd(2024, 2, 29)]);
    }

    #[test]
    fn long_game_buys_once_and_holds() {
        let series = series_from(&[10.0, 12.0, 8.0], &[11.0, 9.0, 13.0]);
        let ind = Indicators::compute(&series);
        let result = run_long_game(&series, &ind, &config(1005.0)).unwrap();
        assert_eq!(result.final_shares, 100);
        assert_eq!(result.trades, 1);
        assert_relative_eq!(result.final_cash, 5.0);
        assert_eq!(result.trajectory.values(), vec![1105.0, 905.0, 1305.0]);
        assert_relative_eq!(result.final_worth, 1305.0);
        assert_eq!(result.checkpoints.len(), 4);
        assert!(result.checkpoints.iter().all(|c| c.observed.is_none()));
    }

    #[test]
    fn long_game_records_first_day_near_anniversary() {
        let start = ymd(2020, 6, 10);
        let dates = [start, ymd(2021, 6, 8), ymd(2021, 6, 9), ymd(2021, 6, 14)];
        let records: Vec<OhlcvRecord> = dates
            .iter()
            .enumerate()
            .map(|(i, &date)| OhlcvRecord {
                date,
                open: 10.0 + i as f64,
                high: 20.0,
                low: 5.0,
                close: 10.0,
                adj_close: 10.0,
                volume: 1.0,
            })
            .collect();
        let series = OhlcvSeries::new(records);
        let ind = Indicators::compute(&series);
        let result = run_long_game(&series, &ind, &config(100.0)).unwrap();

        let first = &result.checkpoints[0];
        assert_eq!(first.anniversary, ymd(2021, 6, 10));
        assert_eq!(first.observed, Some((ymd(2021, 6, 8), 11.0)));
        assert!(result.checkpoints[1].observed.is_none());
        assert_eq!(result.final_shares, 10);
    }

    #[test]
    fn rsi_ma_buys_thirty_percent_on_signal() {
        let series = series_from(&[10.0, 10.0], &[10.0, 10.0]);
        let ind = scripted(vec![9.0, 11.0], vec![50.0, 50.0]);
        let result = run_rsi_ma(&series, &ind, &config(1000.0)).unwrap();
        // day 0: buy 30 shares, day 1: ma above open, no signal
        assert_eq!(result.final_shares, 30);
        assert_eq!(result.trades, 1);
        assert_relative_eq!(result.final_cash, 700.0, epsilon = 1e-9);
        assert_relative_eq!(result.final_worth, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn rsi_ma_sells_half_on_overbought_down_cross() {
        let series = series_from(&[10.0, 10.0, 10.0], &[10.0, 10.0, 10.0]);
        let ind = scripted(vec![9.0, 9.0, 11.0], vec![50.0, 75.0, 65.0]);
        let result = run_rsi_ma(&series, &ind, &config(1000.0)).unwrap();
        // day 0 buy 30, day 1 overbought (no trade), day 2 sell 15
        assert_eq!(result.final_shares, 15);
        assert_eq!(result.trades, 2);
        assert_relative_eq!(result.final_cash, 850.0, epsilon = 1e-9);
    }

    #[test]
    fn rsi_ma_skips_buy_when_cash_below_price() {
        let series = series_from(&[500.0], &[500.0]);
        let ind = scripted(vec![400.0], vec![50.0]);
        let result = run_rsi_ma(&series, &ind, &config(400.0)).unwrap();
        assert_eq!(result.trades, 0);
        assert_relative_eq!(result.final_worth, 400.0);
    }

    #[test]
    fn rsi_ma_stops_after_doubling() {
        // buy 30 @ 10 on day 0, price jumps so worth > 2x, RSI flat
        let opens = [10.0, 10.0, 10.0, 10.0, 10.0];
        let closes = [10.0, 60.0, 60.0, 60.0, 60.0];
        let series = series_from(&opens, &closes);
        let ind = scripted(vec![9.0; 5], vec![50.0; 5]);
        let result = run_rsi_ma(&series, &ind, &config(1000.0)).unwrap();
        // day 0 and 1 buy; day 2 worth >= 2000 with flat RSI stops the run
        assert_eq!(result.stopped_on, Some(ymd(2024, 1, 3)));
        assert_eq!(result.trades, 3);
        let shares_at_stop = result.trajectory.points[2].shares;
        assert_eq!(result.final_shares, shares_at_stop);
        assert_eq!(result.trajectory.len(), 5);
    }

    #[test]
    fn rsi_on_a_threshold_is_neither_neutral_nor_overbought() {
        let opens = [10.0, 10.0, 10.0];
        let series = series_from(&opens, &opens);
        let ind = scripted(vec![9.0; 3], vec![50.0, 70.0, 30.0]);

        // open equals the last buy, so only RSI could trigger a trade
        let breakout = run_breakout(&series, &ind, &config(1000.0)).unwrap();
        assert_eq!(breakout.trades, 1);
        assert_eq!(breakout.final_shares, 100);

        let rsi_ma = run_rsi_ma(&series, &ind, &config(1000.0)).unwrap();
        // only day 0 (RSI 50, MA under open) buys
        assert_eq!(rsi_ma.trades, 1);
    }

    #[test]
    fn breakout_stops_after_doubling() {
        let opens = [10.0, 25.0, 25.0, 5.0, 5.0];
        let series = series_from(&opens, &opens);
        let ind = scripted(vec![10.0; 5], vec![50.0, 80.0, 80.0, 50.0, 50.0]);
        let result = run_breakout(&series, &ind, &config(1000.0)).unwrap();

        // day 0 buys 100 @ 10, day 1 sells all @ 25 (worth 2500), day 2 stops
        assert_eq!(result.stopped_on, Some(ymd(2024, 1, 3)));
        assert_eq!(result.trades, 2);
        // day 3 dips under the last buy price but no longer trades
        assert_eq!(result.final_shares, 0);
        assert_relative_eq!(result.final_cash, 2500.0);
        assert_relative_eq!(result.final_worth, 2500.0);
        assert!(result.trajectory.points[2..].iter().all(|p| p.shares == 0));
        assert_eq!(result.trajectory.len(), 5);
    }

    #[test]
    fn breakout_liquidates_on_overbought_then_rebuys_on_dip() {
        let opens = [10.0, 10.0, 9.0];
        let series = series_from(&opens, &opens);
        let ind = scripted(vec![10.0; 3], vec![100.0, 80.0, 80.0]);
        let result = run_breakout(&series, &ind, &config(1000.0)).unwrap();
        // day 0 all in (100), day 1 RSI>70 sells all, day 2 dip buys 111
        assert_eq!(result.trades, 3);
        assert_eq!(result.final_shares, 111);
        assert_relative_eq!(result.final_cash, 1.0, epsilon = 1e-9);
        assert_eq!(result.trajectory.len(), 3);
        assert_relative_eq!(result.trajectory.points[0].net_worth, 1000.0);
    }

    #[test]
    fn breakout_buy_takes_precedence() {
        let opens = [10.0, 9.0];
        let series = series_from(&opens, &opens);
        // price dipped and RSI is overbought: buy branch wins
        let ind = scripted(vec![10.0; 2], vec![50.0, 90.0]);
        let result = run_breakout(&series, &ind, &config(1005.0)).unwrap();
        // day 0: 100 shares, cash 5; day 1: cash affords 0 more, still no sell
        assert_eq!(result.final_shares, 100);
        assert_eq!(result.trades, 1);
    }

    #[test]
    fn flat_market_leaves_balance_untouched() {
        let series = series_from(&[50.0; 30], &[50.0; 30]);
        let ind = Indicators::compute(&series);
        for kind in [StrategyKind::RsiMa, StrategyKind::Breakout] {
            let result = run(kind, &series, &ind, &config(1000.0)).unwrap();
            assert_eq!(result.final_worth, 1000.0, "{kind}");
            assert_eq!(result.trajectory.len(), 30);
        }
    }
}
