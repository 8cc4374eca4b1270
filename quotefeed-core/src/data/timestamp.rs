//! Timestamp resolution.
//!
//! Intraday times are computed in epoch seconds first (`anchor + tick * interval`)
//! and localized exactly once into the exchange zone, so a DST change between
//! the anchor and a sample never shifts the sample twice. Historical dates carry
//! no time and no zone.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;

/// Exchange zone used for intraday keys unless configured otherwise.
pub const DEFAULT_EXCHANGE_TZ: Tz = chrono_tz::America::New_York;

/// Per-call intraday state: the current sampling interval and session anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalContext {
    interval_secs: Option<i64>,
    anchor_epoch: Option<i64>,
}

impl IntervalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_interval(&mut self, secs: i64) {
        self.interval_secs = Some(secs);
    }

    /// Start a new session at `epoch`.
    pub fn set_anchor(&mut self, epoch: i64) {
        self.anchor_epoch = Some(epoch);
    }

    /// Epoch seconds of the sample `tick` intervals after the anchor.
    pub fn resolve(&self, tick: i64) -> Result<i64, String> {
        let anchor = self
            .anchor_epoch
            .ok_or_else(|| "sample line before any anchor line".to_string())?;
        let interval = self
            .interval_secs
            .ok_or_else(|| "sample line before any INTERVAL line".to_string())?;
        tick.checked_mul(interval)
            .and_then(|offset| anchor.checked_add(offset))
            .ok_or_else(|| format!("tick {tick} x interval {interval} overflows"))
    }
}

/// Local wall-clock time in `tz` for an epoch-seconds instant.
pub fn localize(epoch: i64, tz: Tz) -> Result<NaiveDateTime, String> {
    DateTime::from_timestamp(epoch, 0)
        .map(|utc| utc.with_timezone(&tz).naive_local())
        .ok_or_else(|| format!("epoch seconds {epoch} out of range"))
}

/// Parse a `d-Mon-yy` token such as `5-Jan-09`.
///
/// Two-digit years pivot at 69: `00`..`68` are 20xx, `69`..`99` are 19xx.
pub fn parse_history_date(token: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(token, "%d-%b-%y")
        .map_err(|e| format!("invalid date '{token}': {e}"))
}
