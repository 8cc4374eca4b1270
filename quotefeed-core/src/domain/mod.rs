//! Domain types for quote feeds

pub mod quote;
pub mod request;
pub mod table;

pub use quote::{Ohlcv, QuoteColumn, QuoteRow};
pub use request::{FeedKind, FeedRequest, HistoryRequest, IntradayRequest};
pub use table::{DuplicateKey, OnDuplicateKey, QuoteTable, TableKey, Upsert};
