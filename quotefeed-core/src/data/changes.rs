//! Close-to-close change calculation.

use crate::domain::{QuoteTable, TableKey};

/// Fill `change` and `change_percent` for every row after the first.
///
/// The table must already be in ascending key order. Row 0 keeps its
/// undefined values. A zero previous close is not guarded: the percentage
/// follows IEEE 754 (`inf`, or `NaN` for `0 / 0`).
pub fn apply_changes<K: TableKey>(table: &mut QuoteTable<K>) {
    let rows = table.rows_mut();
    for i in 1..rows.len() {
        let previous = rows[i - 1].close;
        let current = rows[i].close;
        rows[i].change = current - previous;
        rows[i].change_percent = (current / previous) - 1.0;
    }
}
