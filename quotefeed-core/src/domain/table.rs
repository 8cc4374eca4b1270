//! QuoteTable: the ordered, timestamp-keyed result of one feed call.
//!
//! A table is built by the feed parsers through crate-private mutators and is
//! read-only once handed to the caller.

use super::quote::{Ohlcv, QuoteColumn, QuoteRow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::io;

/// Keys a quote table can be indexed by.
pub trait TableKey: Copy + Ord + Hash + Debug + Display + Send + Sync + 'static {}

impl<T> TableKey for T where T: Copy + Ord + Hash + Debug + Display + Send + Sync + 'static {}

/// What to do when a row arrives for a key that is already in the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDuplicateKey {
    /// Last write wins: the existing row keeps its position, its columns are replaced.
    #[default]
    Overwrite,
    /// Fail the parse.
    Reject,
}

/// Outcome of a single upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Overwritten,
}

/// A row was offered for a key the table already holds under `OnDuplicateKey::Reject`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateKey<K>(pub K);

/// Ordered collection of quote rows with a uniform column set.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteTable<K: TableKey> {
    rows: Vec<QuoteRow<K>>,
    #[serde(skip)]
    index: HashMap<K, usize>,
    #[serde(skip)]
    on_duplicate: OnDuplicateKey,
}

impl<K: TableKey> QuoteTable<K> {
    pub(crate) fn new(on_duplicate: OnDuplicateKey) -> Self {
        Self::with_capacity(on_duplicate, 0)
    }

    pub(crate) fn with_capacity(on_duplicate: OnDuplicateKey, capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            on_duplicate,
        }
    }

    /// Insert a row, or resolve a key collision according to the table's policy.
    pub(crate) fn upsert(&mut self, key: K, values: Ohlcv) -> Result<Upsert, DuplicateKey<K>> {
        match self.index.get(&key) {
            Some(&pos) => match self.on_duplicate {
                OnDuplicateKey::Overwrite => {
                    self.rows[pos].assign(values);
                    Ok(Upsert::Overwritten)
                }
                OnDuplicateKey::Reject => Err(DuplicateKey(key)),
            },
            None => {
                self.index.insert(key, self.rows.len());
                self.rows.push(QuoteRow::new(key, values));
                Ok(Upsert::Inserted)
            }
        }
    }

    /// Stable sort by ascending key. Keys are unique, so stability only matters
    /// for readers comparing against encounter order.
    pub(crate) fn sort_by_key(&mut self) {
        self.rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        self.index.clear();
        for (pos, row) in self.rows.iter().enumerate() {
            self.index.insert(row.timestamp, pos);
        }
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [QuoteRow<K>] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[QuoteRow<K>] {
        &self.rows
    }

    pub fn row(&self, pos: usize) -> Option<&QuoteRow<K>> {
        self.rows.get(pos)
    }

    /// Row stored under `key`, if any.
    pub fn get(&self, key: &K) -> Option<&QuoteRow<K>> {
        self.index.get(key).map(|&pos| &self.rows[pos])
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.rows.iter().map(|r| r.timestamp)
    }

    pub fn first_key(&self) -> Option<K> {
        self.rows.first().map(|r| r.timestamp)
    }

    pub fn last_key(&self) -> Option<K> {
        self.rows.last().map(|r| r.timestamp)
    }

    /// All values of one column in row order.
    pub fn column(&self, column: QuoteColumn) -> Vec<f64> {
        self.rows.iter().map(|r| r.get(column)).collect()
    }

    pub fn is_strictly_ascending(&self) -> bool {
        self.rows.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
    }

    /// BLAKE3 digest over keys and the exact bit patterns of every column.
    ///
    /// Two parses of the same response text produce the same hash.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for row in &self.rows {
            hasher.update(row.timestamp.to_string().as_bytes());
            for column in QuoteColumn::ALL {
                hasher.update(&row.get(column).to_bits().to_le_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Write the table as CSV: a `Date` key column followed by the quote columns.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        let mut header = vec!["Date"];
        header.extend(QuoteColumn::ALL.iter().map(|c| c.name()));
        wtr.write_record(&header)?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(QuoteColumn::ALL.len() + 1);
            record.push(row.timestamp.to_string());
            record.extend(QuoteColumn::ALL.iter().map(|&c| row.get(c).to_string()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, csv::Error> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// JSON form `{"rows": [...]}`. `NaN` change columns serialize as `null`.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error>
    where
        K: Serialize,
    {
        serde_json::to_string_pretty(self)
    }
}
