//! Intraday tick-stream parser.
//!
//! The stream is chronological by construction, so rows are kept in
//! encounter order without a sort. `INTERVAL=` and anchor lines update a
//! per-call [`IntervalContext`]; nothing survives between calls.

use super::changes::apply_changes;
use super::classify::{classify_intraday, LineShape};
use super::error::LoadCause;
use super::timestamp::{localize, IntervalContext};
use super::{for_each_line, insert_row};
use crate::domain::{OnDuplicateKey, QuoteTable, Upsert};
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use log::{debug, warn};
use std::io::BufRead;

/// Typical five-day minute-bar response size.
const INTRADAY_CAPACITY: usize = 5000;

/// Parse an intraday response into a table keyed by local exchange time,
/// with close-to-close changes filled in.
pub fn parse_intraday<R: BufRead>(
    reader: R,
    tz: Tz,
    on_duplicate: OnDuplicateKey,
) -> Result<QuoteTable<NaiveDateTime>, LoadCause> {
    let mut table = QuoteTable::with_capacity(on_duplicate, INTRADAY_CAPACITY);
    let mut ctx = IntervalContext::new();
    let mut skipped = 0usize;
    let mut overwritten = 0usize;

    for_each_line(reader, |line_no, line| {
        let (epoch, fields) = match classify_intraday(line) {
            LineShape::Interval(secs) => {
                ctx.set_interval(parse_int(secs, "interval", line_no)?);
                return Ok(());
            }
            LineShape::Anchor { epoch, fields } => {
                let epoch = parse_int(epoch, "anchor epoch", line_no)?;
                ctx.set_anchor(epoch);
                (epoch, fields)
            }
            LineShape::Sample { tick, fields } => {
                let tick = parse_int(tick, "tick index", line_no)?;
                let epoch = ctx
                    .resolve(tick)
                    .map_err(|reason| LoadCause::parse(line_no, reason))?;
                (epoch, fields)
            }
            LineShape::History { .. } | LineShape::Unrecognized => {
                skipped += 1;
                return Ok(());
            }
        };

        let timestamp = localize(epoch, tz).map_err(|reason| LoadCause::parse(line_no, reason))?;
        if insert_row(&mut table, timestamp, fields, line_no)? == Upsert::Overwritten {
            overwritten += 1;
        }
        Ok(())
    })?;

    debug!(
        "intraday parse: {} rows, {skipped} lines skipped, {overwritten} overwritten",
        table.len()
    );
    if !table.is_strictly_ascending() {
        warn!("intraday stream produced out-of-order timestamps; rows kept in feed order");
    }

    apply_changes(&mut table);
    Ok(table)
}

fn parse_int(raw: &str, what: &str, line_no: usize) -> Result<i64, LoadCause> {
    raw.parse::<i64>()
        .map_err(|e| LoadCause::parse(line_no, format!("invalid {what} '{raw}': {e}")))
}
