//! QuoteRow: one observation in a quote table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five price/volume values carried by every data line of either feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A single quote keyed by `K` (`NaiveDate` for end-of-day, `NaiveDateTime` for intraday).
///
/// `change` and `change_percent` are `NaN` until the change pass fills them in.
/// The first row of a table never gets a value because it has no prior close.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteRow<K> {
    pub timestamp: K,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl<K> QuoteRow<K> {
    /// New row with undefined change columns.
    pub fn new(timestamp: K, values: Ohlcv) -> Self {
        Self {
            timestamp,
            open: values.open,
            high: values.high,
            low: values.low,
            close: values.close,
            volume: values.volume,
            change: f64::NAN,
            change_percent: f64::NAN,
        }
    }

    /// Overwrite the price/volume columns, resetting the derived columns.
    pub(crate) fn assign(&mut self, values: Ohlcv) {
        self.open = values.open;
        self.high = values.high;
        self.low = values.low;
        self.close = values.close;
        self.volume = values.volume;
        self.change = f64::NAN;
        self.change_percent = f64::NAN;
    }

    /// Value of a single column.
    pub fn get(&self, column: QuoteColumn) -> f64 {
        match column {
            QuoteColumn::Open => self.open,
            QuoteColumn::High => self.high,
            QuoteColumn::Low => self.low,
            QuoteColumn::Close => self.close,
            QuoteColumn::Volume => self.volume,
            QuoteColumn::Change => self.change,
            QuoteColumn::ChangePercent => self.change_percent,
        }
    }

    /// Basic sanity check used by tests and callers: high >= low, high bounds
    /// open and close, low bounds open and close. Parsing never enforces this.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

/// The fixed, ordered column set shared by both feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuoteColumn {
    Open,
    High,
    Low,
    Close,
    Volume,
    Change,
    ChangePercent,
}

impl QuoteColumn {
    pub const ALL: [QuoteColumn; 7] = [
        QuoteColumn::Open,
        QuoteColumn::High,
        QuoteColumn::Low,
        QuoteColumn::Close,
        QuoteColumn::Volume,
        QuoteColumn::Change,
        QuoteColumn::ChangePercent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            QuoteColumn::Open => "Open",
            QuoteColumn::High => "High",
            QuoteColumn::Low => "Low",
            QuoteColumn::Close => "Close",
            QuoteColumn::Volume => "Volume",
            QuoteColumn::Change => "Change",
            QuoteColumn::ChangePercent => "ChangePercent",
        }
    }
}

impl fmt::Display for QuoteColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
