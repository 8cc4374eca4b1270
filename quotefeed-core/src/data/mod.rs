//! Feed fetching and parsing

pub mod batch;
pub mod changes;
pub mod classify;
pub mod config;
pub mod error;
pub mod history;
pub mod intraday;
pub mod request;
pub mod source;
pub mod timestamp;
pub mod transport;

pub use batch::{fetch_all, BatchSummary, FetchProgress, LogProgress};
pub use changes::apply_changes;
pub use config::{FeedConfig, HistoryConfig, HttpConfig, IntradayConfig};
pub use error::{ConfigError, DataError, LoadCause};
pub use history::parse_history;
pub use intraday::parse_intraday;
pub use source::{HistorySource, IntradaySource, QuoteSource};
pub use timestamp::{IntervalContext, DEFAULT_EXCHANGE_TZ};
pub use transport::{HttpTransport, QuoteTransport, StaticTransport};

use crate::domain::{DuplicateKey, QuoteTable, TableKey, Upsert};
use classify::RawFields;
use std::io::BufRead;

/// Visit each response line with its 1-based number, newline removed.
///
/// Invalid UTF-8 is decoded lossily, so a damaged line reaches the
/// classifier as noise. Only a failing read is an I/O error.
pub(crate) fn for_each_line<R, F>(mut reader: R, mut visit: F) -> Result<(), LoadCause>
where
    R: BufRead,
    F: FnMut(usize, &str) -> Result<(), LoadCause>,
{
    let mut buf = Vec::new();
    let mut line_no = 0usize;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        line_no += 1;
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        visit(line_no, &String::from_utf8_lossy(&buf))?;
    }
}

/// Convert a classified line's fields and upsert them, mapping failures to
/// parse errors on `line_no`.
pub(crate) fn insert_row<K: TableKey>(
    table: &mut QuoteTable<K>,
    key: K,
    fields: RawFields<'_>,
    line_no: usize,
) -> Result<Upsert, LoadCause> {
    let values = fields
        .to_ohlcv()
        .map_err(|reason| LoadCause::parse(line_no, reason))?;
    table
        .upsert(key, values)
        .map_err(|DuplicateKey(key)| LoadCause::DuplicateKey {
            line: line_no,
            key: key.to_string(),
        })
}
