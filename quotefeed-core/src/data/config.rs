//! Feed configuration: URL templates, exchange zone, duplicate policy, HTTP client.
//!
//! Every key has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! [intraday]
//! url_template = "http://www.google.com/finance/getprices?i=60&p=<DAYS>d&f=d,o,h,l,c,v&df=cpct&q=<TICKER>"
//! timezone = "America/New_York"
//! on_duplicate = "overwrite"
//!
//! [history]
//! url_template = "http://www.google.com/finance/historical?output=csv&q=<TICKER>&startdate=<START>&enddate=<END>"
//! on_duplicate = "overwrite"
//!
//! [http]
//! user_agent = "quotefeed/0.1"
//! timeout_secs = 30
//! ```

use super::error::ConfigError;
use crate::domain::OnDuplicateKey;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_INTRADAY_URL: &str =
    "http://www.google.com/finance/getprices?i=60&p=<DAYS>d&f=d,o,h,l,c,v&df=cpct&q=<TICKER>";
pub const DEFAULT_HISTORY_URL: &str =
    "http://www.google.com/finance/historical?output=csv&q=<TICKER>&startdate=<START>&enddate=<END>";

/// Top-level configuration for both feed sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub intraday: IntradayConfig,
    pub history: HistoryConfig,
    pub http: HttpConfig,
}

impl FeedConfig {
    /// Load from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: FeedConfig = toml::from_str(s)?;
        config.intraday.tz()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntradayConfig {
    /// Template with `<TICKER>` and `<DAYS>` placeholders.
    pub url_template: String,
    /// IANA zone the intraday keys are localized into.
    pub timezone: String,
    pub on_duplicate: OnDuplicateKey,
}

impl IntradayConfig {
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))
    }
}

impl Default for IntradayConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_INTRADAY_URL.to_string(),
            timezone: "America/New_York".to_string(),
            on_duplicate: OnDuplicateKey::Overwrite,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Template with `<TICKER>`, `<START>` and `<END>` placeholders.
    pub url_template: String,
    pub on_duplicate: OnDuplicateKey,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_HISTORY_URL.to_string(),
            on_duplicate: OnDuplicateKey::Overwrite,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Whole-request timeout; `None` keeps the client default.
    pub timeout_secs: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("quotefeed/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: None,
        }
    }
}
