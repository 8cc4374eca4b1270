//! Structured error types for feed operations.

use crate::domain::FeedKind;
use thiserror::Error;

/// Top-level error returned by every feed source.
///
/// Designed to be displayable in CLI contexts: validation failures name the
/// bad parameter, load failures name the ticker and feed, and keep the
/// underlying cause reachable through `std::error::Error::source`.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("failed to load {feed} quotes for {ticker}")]
    LoadFailed {
        ticker: String,
        feed: FeedKind,
        #[source]
        cause: LoadCause,
    },
}

impl DataError {
    pub(crate) fn load(ticker: &str, feed: FeedKind, cause: LoadCause) -> Self {
        DataError::LoadFailed {
            ticker: ticker.to_string(),
            feed,
            cause,
        }
    }

    /// Underlying fetch or parse failure, if this is a load error.
    pub fn cause(&self) -> Option<&LoadCause> {
        match self {
            DataError::LoadFailed { cause, .. } => Some(cause),
            DataError::ValidationError(_) => None,
        }
    }
}

/// Why a fetch-then-parse call failed.
#[derive(Debug, Error)]
pub enum LoadCause {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("no response registered for {0}")]
    NoResponse(String),

    #[error("read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("line {line}: duplicate timestamp {key}")]
    DuplicateKey { line: usize, key: String },
}

impl LoadCause {
    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> Self {
        LoadCause::Parse {
            line,
            reason: reason.into(),
        }
    }

    /// True for transport-level failures (as opposed to bad response content).
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            LoadCause::NetworkUnreachable(_)
                | LoadCause::HttpStatus { .. }
                | LoadCause::NoResponse(_)
                | LoadCause::Io(_)
        )
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, LoadCause::Parse { .. } | LoadCause::DuplicateKey { .. })
    }
}

/// Errors loading a `FeedConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown time zone '{0}'")]
    InvalidTimezone(String),

    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),
}
