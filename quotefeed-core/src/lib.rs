//! quotefeed core: intraday and end-of-day quote feeds parsed into ordered tables.
//!
//! This crate contains:
//! - Domain types (quote rows, quote tables, fetch requests)
//! - Line classification for the intraday tick stream and the historical CSV stream
//! - Timestamp resolution (epoch + tick offsets localized to the exchange zone, `d-Mon-yy` dates)
//! - Table building with an explicit duplicate-key policy
//! - Close-to-close change calculation
//! - A blocking HTTP transport and feed sources that tie the pipeline together

pub mod data;
pub mod domain;

pub use data::{DataError, HistorySource, IntradaySource, QuoteSource};
pub use domain::{HistoryRequest, IntradayRequest, QuoteColumn, QuoteRow, QuoteTable};
