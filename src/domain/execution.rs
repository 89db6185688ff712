//! Trade sizing and fills shared by the strategies.
//!
//! Fills happen at the day's open price, in whole shares, with no commission
//! or slippage.

use super::portfolio::Portfolio;
use super::rounding::round2;

/// Fraction of cash a partial buy may spend.
pub const PARTIAL_BUY_FRACTION: f64 = 0.3;
/// Fraction of held shares a partial sell releases.
pub const PARTIAL_SELL_FRACTION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TradeResult {
    Filled { side: Side, quantity: u64, price: f64 },
    Skipped,
}

impl TradeResult {
    fn from_fill(side: Side, quantity: u64, price: f64) -> Self {
        if quantity == 0 {
            TradeResult::Skipped
        } else {
            TradeResult::Filled {
                side,
                quantity,
                price,
            }
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, TradeResult::Filled { .. })
    }
}

/// Shares a partial buy takes: `min(30% of cash, all cash) / price`,
/// truncated. The price is quoted at 2 decimals for sizing.
pub fn partial_buy_quantity(cash: f64, price: f64) -> u64 {
    let quote = round2(price);
    if quote <= 0.0 || cash <= 0.0 {
        return 0;
    }
    let fraction = (cash * PARTIAL_BUY_FRACTION / quote).min(cash / quote);
    fraction.floor() as u64
}

/// Shares a partial sell releases: half the position, rounded down.
pub fn partial_sell_quantity(shares: u64) -> u64 {
    (shares as f64 * PARTIAL_SELL_FRACTION).floor() as u64
}

/// Spend at most 30% of cash on shares at `price`.
pub fn buy_partial(portfolio: &mut Portfolio, price: f64) -> TradeResult {
    let wanted = partial_buy_quantity(portfolio.cash, price);
    let bought = portfolio.buy(wanted, price);
    TradeResult::from_fill(Side::Buy, bought, price)
}

/// Spend all cash on as many whole shares as it affords.
pub fn buy_max(portfolio: &mut Portfolio, price: f64) -> TradeResult {
    let wanted = portfolio.affordable_shares(price);
    let bought = portfolio.buy(wanted, price);
    TradeResult::from_fill(Side::Buy, bought, price)
}

/// Sell half of the held shares.
pub fn sell_partial(portfolio: &mut Portfolio, price: f64) -> TradeResult {
    let sold = portfolio.sell(partial_sell_quantity(portfolio.shares), price);
    TradeResult::from_fill(Side::Sell, sold, price)
}

/// Sell the whole position.
pub fn sell_all(portfolio: &mut Portfolio, price: f64) -> TradeResult {
    let sold = portfolio.liquidate(price);
    TradeResult::from_fill(Side::Sell, sold, price)
}
