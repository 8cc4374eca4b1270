//! Fetch requests for the two feed variants.

use crate::data::error::DataError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which wire format a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Intraday,
    Historical,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Intraday => f.write_str("intraday"),
            FeedKind::Historical => f.write_str("historical"),
        }
    }
}

/// Common view of a request, used for error context and batch reporting.
pub trait FeedRequest {
    fn ticker(&self) -> &str;
}

/// Minute bars for the last `day_count` trading days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntradayRequest {
    pub ticker: String,
    pub day_count: u32,
}

impl IntradayRequest {
    pub fn new(ticker: impl Into<String>, day_count: u32) -> Self {
        Self {
            ticker: ticker.into(),
            day_count,
        }
    }

    pub fn validate(&self) -> Result<(), DataError> {
        validate_ticker(&self.ticker)?;
        if self.day_count == 0 {
            return Err(DataError::ValidationError(
                "the day count must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Daily bars between `start` and `end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRequest {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl HistoryRequest {
    pub fn new(ticker: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: ticker.into(),
            start,
            end,
        }
    }

    pub fn validate(&self) -> Result<(), DataError> {
        validate_ticker(&self.ticker)?;
        if self.start >= self.end {
            return Err(DataError::ValidationError(format!(
                "the start date {} must be before the end date {}",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

impl FeedRequest for IntradayRequest {
    fn ticker(&self) -> &str {
        &self.ticker
    }
}

impl FeedRequest for HistoryRequest {
    fn ticker(&self) -> &str {
        &self.ticker
    }
}

fn validate_ticker(ticker: &str) -> Result<(), DataError> {
    if ticker.trim().is_empty() {
        return Err(DataError::ValidationError(
            "the security ticker must be specified".into(),
        ));
    }
    Ok(())
}
