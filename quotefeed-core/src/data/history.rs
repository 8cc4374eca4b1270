//! Historical end-of-day CSV parser.
//!
//! The feed does not promise any row order (it is usually newest first), so
//! rows are collected in encounter order and sorted once by date before the
//! change pass.

use super::changes::apply_changes;
use super::classify::{classify_history, LineShape};
use super::error::LoadCause;
use super::{for_each_line, insert_row};
use super::timestamp::parse_history_date;
use crate::domain::{OnDuplicateKey, QuoteTable};
use chrono::NaiveDate;
use log::debug;
use std::io::BufRead;

/// Roughly four years of trading days.
const HISTORY_CAPACITY: usize = 1000;

/// Parse a historical response into an ascending, date-keyed table with
/// close-to-close changes filled in.
pub fn parse_history<R: BufRead>(
    reader: R,
    on_duplicate: OnDuplicateKey,
) -> Result<QuoteTable<NaiveDate>, LoadCause> {
    let mut table = QuoteTable::with_capacity(on_duplicate, HISTORY_CAPACITY);
    let mut skipped = 0usize;

    for_each_line(reader, |line_no, line| {
        match classify_history(line) {
            LineShape::History { date, fields } => {
                let date =
                    parse_history_date(date).map_err(|reason| LoadCause::parse(line_no, reason))?;
                insert_row(&mut table, date, fields, line_no)?;
            }
            _ => skipped += 1,
        }
        Ok(())
    })?;

    debug!(
        "historical parse: {} rows, {skipped} lines skipped",
        table.len()
    );

    table.sort_by_key();
    apply_changes(&mut table);
    Ok(table)
}
