//! Batch fetch: runs several requests against one source with progress reporting.
//!
//! Requests run sequentially; a failure for one ticker is recorded and the
//! batch moves on. There are no retries.

use super::error::DataError;
use super::source::QuoteSource;
use crate::domain::{FeedKind, FeedRequest, QuoteTable, TableKey};
use log::{info, warn};

/// Progress callback for multi-ticker fetches.
pub trait FetchProgress {
    /// Called before a request is sent.
    fn on_start(&self, ticker: &str, index: usize, total: usize);

    /// Called with the row count on success or the error on failure.
    fn on_complete(
        &self,
        ticker: &str,
        index: usize,
        total: usize,
        result: Result<usize, &DataError>,
    );

    /// Called once after the last request.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that writes through the `log` facade.
pub struct LogProgress;

impl FetchProgress for LogProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        info!("[{}/{}] fetching {ticker}", index + 1, total);
    }

    fn on_complete(
        &self,
        ticker: &str,
        _index: usize,
        _total: usize,
        result: Result<usize, &DataError>,
    ) {
        match result {
            Ok(rows) => info!("{ticker}: {rows} rows"),
            Err(e) => warn!("{ticker}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        info!("batch complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// Tables and errors from one batch, each tagged with its ticker, in request order.
#[derive(Debug)]
pub struct BatchSummary<K: TableKey> {
    pub feed: FeedKind,
    pub tables: Vec<(String, QuoteTable<K>)>,
    pub errors: Vec<(String, DataError)>,
}

impl<K: TableKey> BatchSummary<K> {
    pub fn total(&self) -> usize {
        self.tables.len() + self.errors.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Fetch every request with `source`.
pub fn fetch_all<S: QuoteSource>(
    source: &S,
    requests: &[S::Request],
    progress: &dyn FetchProgress,
) -> BatchSummary<S::Key> {
    let total = requests.len();
    let mut tables = Vec::new();
    let mut errors = Vec::new();

    for (i, request) in requests.iter().enumerate() {
        let ticker = request.ticker().to_string();
        progress.on_start(&ticker, i, total);

        match source.read(request) {
            Ok(table) => {
                progress.on_complete(&ticker, i, total, Ok(table.len()));
                tables.push((ticker, table));
            }
            Err(e) => {
                progress.on_complete(&ticker, i, total, Err(&e));
                errors.push((ticker, e));
            }
        }
    }

    progress.on_batch_complete(tables.len(), errors.len(), total);

    BatchSummary {
        feed: source.feed(),
        tables,
        errors,
    }
}
