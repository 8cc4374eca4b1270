//! Line classifier for both feed formats.
//!
//! Each response line is matched once against the active feed's shapes and
//! turned into a tagged [`LineShape`] carrying the captured text. Rows are then
//! built from those captures without re-matching.
//!
//! Intraday shapes, first match wins:
//! - `INTERVAL=<secs>`: sampling interval for the lines that follow
//! - `a<epoch>,o,h,l,c,v`: anchor sample at an absolute epoch-seconds time
//! - `<tick>,o,h,l,c,v`: sample at `anchor + tick * interval`
//!
//! Historical shape:
//! - `<d>-<Mon>-<yy>,o,h,l,c,v`
//!
//! Anything else is `Unrecognized` and skipped by the parsers.

use crate::domain::{Ohlcv, QuoteColumn};
use regex::{Captures, Regex};
use std::sync::LazyLock;

macro_rules! re {
    ($pat:expr) => {
        LazyLock::new(|| Regex::new($pat).unwrap())
    };
}

static RE_INTERVAL: LazyLock<Regex> = re!(r"^INTERVAL=([0-9]+)$");
static RE_ANCHOR: LazyLock<Regex> = re!(r"^a([0-9]+),([^,]*),([^,]*),([^,]*),([^,]*),([^,]*)$");
static RE_SAMPLE: LazyLock<Regex> = re!(r"^([0-9]+),([^,]*),([^,]*),([^,]*),([^,]*),([^,]*)$");
static RE_HISTORY: LazyLock<Regex> =
    re!(r"^([0-9]{1,2}-[A-Za-z]{3}-[0-9]{2}),([^,]*),([^,]*),([^,]*),([^,]*),([^,]*)$");

/// The five captured numeric fields of a data line, still as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFields<'a> {
    pub open: &'a str,
    pub high: &'a str,
    pub low: &'a str,
    pub close: &'a str,
    pub volume: &'a str,
}

impl<'a> RawFields<'a> {
    /// Fields from capture groups 2..=6.
    fn from_captures(caps: &Captures<'a>) -> Self {
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        Self {
            open: group(2),
            high: group(3),
            low: group(4),
            close: group(5),
            volume: group(6),
        }
    }

    /// Convert to floats, naming the first column that fails.
    pub fn to_ohlcv(&self) -> Result<Ohlcv, String> {
        Ok(Ohlcv {
            open: parse_field(QuoteColumn::Open, self.open)?,
            high: parse_field(QuoteColumn::High, self.high)?,
            low: parse_field(QuoteColumn::Low, self.low)?,
            close: parse_field(QuoteColumn::Close, self.close)?,
            volume: parse_field(QuoteColumn::Volume, self.volume)?,
        })
    }
}

fn parse_field(column: QuoteColumn, raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid {column} value '{raw}': {e}"))
}

/// Classification of a single response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineShape<'a> {
    /// Interval metadata; the raw digits (overflow is reported by the parser).
    Interval(&'a str),
    /// First sample of a session with an absolute epoch-seconds time.
    Anchor { epoch: &'a str, fields: RawFields<'a> },
    /// Sample at a tick offset from the current anchor.
    Sample { tick: &'a str, fields: RawFields<'a> },
    /// End-of-day row with a `d-Mon-yy` date token.
    History { date: &'a str, fields: RawFields<'a> },
    Unrecognized,
}

/// Strip the carriage return left behind by CRLF responses.
fn trim_line(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

pub fn classify_intraday(line: &str) -> LineShape<'_> {
    let line = trim_line(line);

    if let Some(caps) = RE_INTERVAL.captures(line) {
        return caps
            .get(1)
            .map_or(LineShape::Unrecognized, |m| LineShape::Interval(m.as_str()));
    }
    if let Some(caps) = RE_ANCHOR.captures(line) {
        let fields = RawFields::from_captures(&caps);
        return caps
            .get(1)
            .map_or(LineShape::Unrecognized, |m| LineShape::Anchor {
                epoch: m.as_str(),
                fields,
            });
    }
    if let Some(caps) = RE_SAMPLE.captures(line) {
        let fields = RawFields::from_captures(&caps);
        return caps
            .get(1)
            .map_or(LineShape::Unrecognized, |m| LineShape::Sample {
                tick: m.as_str(),
                fields,
            });
    }
    LineShape::Unrecognized
}

pub fn classify_history(line: &str) -> LineShape<'_> {
    let line = trim_line(line);

    match RE_HISTORY.captures(line) {
        Some(caps) => {
            let fields = RawFields::from_captures(&caps);
            caps.get(1)
                .map_or(LineShape::Unrecognized, |m| LineShape::History {
                    date: m.as_str(),
                    fields,
                })
        }
        None => LineShape::Unrecognized,
    }
}
