//! Single-instrument portfolio state and the daily net-worth trajectory.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub net_worth: f64,
    pub cash: f64,
    pub shares: u64,
}

/// One net-worth point per simulated trading day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceTrajectory {
    pub points: Vec<EquityPoint>,
}

impl PerformanceTrajectory {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            points: Vec::with_capacity(n),
        }
    }

    /// Mark `portfolio` to `close` and append the day's point.
    pub fn record(&mut self, date: NaiveDate, portfolio: &Portfolio, close: f64) -> f64 {
        let net_worth = portfolio.net_worth(close);
        self.points.push(EquityPoint {
            date,
            net_worth,
            cash: portfolio.cash,
            shares: portfolio.shares,
        });
        net_worth
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.net_worth).collect()
    }

    pub fn last(&self) -> Option<&EquityPoint> {
        self.points.last()
    }
}

/// Cash and whole shares held during one backtest run.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub shares: u64,
}

impl Portfolio {
    pub fn new(initial_balance: f64) -> Self {
        Portfolio {
            cash: initial_balance,
            shares: 0,
        }
    }

    /// Largest whole number of shares the current cash affords at `price`.
    pub fn affordable_shares(&self, price: f64) -> u64 {
        if price <= 0.0 || self.cash <= 0.0 {
            return 0;
        }
        (self.cash / price).floor() as u64
    }

    /// Buy `quantity` shares at `price`. Never spends more than the cash on
    /// hand: the quantity is capped at what is affordable. Returns the number
    /// actually bought.
    pub fn buy(&mut self, quantity: u64, price: f64) -> u64 {
        let mut quantity = quantity.min(self.affordable_shares(price));
        // cash / price can round up across an integer boundary
        while quantity > 0 && quantity as f64 * price > self.cash {
            quantity -= 1;
        }
        if quantity > 0 {
            self.cash -= quantity as f64 * price;
            self.shares += quantity;
        }
        quantity
    }

    /// Sell up to `quantity` shares at `price`. Returns the number sold.
    pub fn sell(&mut self, quantity: u64, price: f64) -> u64 {
        let quantity = quantity.min(self.shares);
        if quantity > 0 {
            self.cash += quantity as f64 * price;
            self.shares -= quantity;
        }
        quantity
    }

    pub fn liquidate(&mut self, price: f64) -> u64 {
        self.sell(self.shares, price)
    }

    pub fn net_worth(&self, close: f64) -> f64 {
        self.cash + self.shares as f64 * close
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn new_portfolio() {
        let p = Portfolio::new(1000.0);
        assert!((p.cash - 1000.0).abs() < f64::EPSILON);
        assert_eq!(p.shares, 0);
    }

    #[test]
    fn affordable_shares_truncates() {
        let p = Portfolio::new(1000.0);
        assert_eq!(p.affordable_shares(30.0), 33);
        assert_eq!(p.affordable_shares(0.0), 0);
        assert_eq!(Portfolio::new(0.0).affordable_shares(10.0), 0);
    }

    #[test]
    fn buy_spends_cash() {
        let mut p = Portfolio::new(1000.0);
        assert_eq!(p.buy(10, 25.0), 10);
        assert_eq!(p.shares, 10);
        assert!((p.cash - 750.0).abs() < f64::EPSILON);
    }

    #[test]
    fn buy_caps_at_affordable() {
        let mut p = Portfolio::new(100.0);
        assert_eq!(p.buy(50, 30.0), 3);
        assert!((p.cash - 10.0).abs() < 1e-9);
    }

    #[test]
    fn sell_caps_at_held() {
        let mut p = Portfolio::new(0.0);
        p.shares = 4;
        assert_eq!(p.sell(10, 5.0), 4);
        assert_eq!(p.shares, 0);
        assert!((p.cash - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn liquidate_sells_everything() {
        let mut p = Portfolio::new(10.0);
        p.shares = 7;
        assert_eq!(p.liquidate(2.0), 7);
        assert_eq!(p.shares, 0);
        assert!((p.cash - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn net_worth_marks_to_close() {
        let mut p = Portfolio::new(50.0);
        p.shares = 10;
        assert!((p.net_worth(12.5) - 175.0).abs() < f64::EPSILON);
    }

    #[test]
    fn trajectory_records_points_in_order() {
        let mut p = Portfolio::new(50.0);
        p.shares = 5;
        let mut t = PerformanceTrajectory::with_capacity(2);
        assert!((t.record(date(1), &p, 10.0) - 100.0).abs() < f64::EPSILON);
        assert!((t.record(date(2), &p, 12.0) - 110.0).abs() < f64::EPSILON);
        assert_eq!(t.len(), 2);
        assert_eq!(t.values(), vec![100.0, 110.0]);
        let last = t.last().unwrap();
        assert_eq!(last.date, date(2));
        assert_eq!(last.shares, 5);
        assert!((last.cash - 50.0).abs() < f64::EPSILON);
    }
}
