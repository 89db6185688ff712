//! Daily OHLCV records and the ordered series built from them.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
}

/// Date-ordered daily records. The index into this series is the join key
/// for every derived series (indicators, trajectories).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OhlcvSeries {
    records: Vec<OhlcvRecord>,
}

impl OhlcvSeries {
    pub fn new(records: Vec<OhlcvRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[OhlcvRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&OhlcvRecord> {
        self.records.get(index)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.open).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.close).collect()
    }

    /// True when no record is dated before its predecessor.
    pub fn is_chronological(&self) -> bool {
        self.records.windows(2).all(|w| w[0].date <= w[1].date)
    }
}

impl From<Vec<OhlcvRecord>> for OhlcvSeries {
    fn from(records: Vec<OhlcvRecord>) -> Self {
        Self::new(records)
    }
}
