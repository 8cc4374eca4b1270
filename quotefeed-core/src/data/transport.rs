//! Transport abstraction: turn a resolved URL into a line-oriented reader.
//!
//! The reader returned by [`QuoteTransport::open`] owns the underlying
//! connection; dropping it releases the connection on every exit path,
//! including a parse error halfway through the body.

use super::config::HttpConfig;
use super::error::{ConfigError, LoadCause};
use log::debug;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Something that can open a response body for a URL.
pub trait QuoteTransport: Send + Sync {
    /// Open a scoped reader over the response body.
    fn open(&self, url: &str) -> Result<Box<dyn BufRead + Send>, LoadCause>;

    /// Read the whole response body as text.
    fn fetch_text(&self, url: &str) -> Result<String, LoadCause> {
        let mut reader = self.open(url)?;
        let mut body = String::new();
        reader.read_to_string(&mut body)?;
        Ok(body)
    }
}

/// Blocking HTTP transport. No retries: a failure surfaces immediately.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, ConfigError> {
        let mut builder =
            reqwest::blocking::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }
}

impl QuoteTransport for HttpTransport {
    fn open(&self, url: &str) -> Result<Box<dyn BufRead + Send>, LoadCause> {
        debug!("GET {url}");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| LoadCause::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoadCause::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(Box::new(BufReader::new(resp)))
    }
}

/// In-memory transport serving canned bodies, for tests and offline runs.
///
/// Bodies are looked up by exact URL first, then the fallback body if one is set.
/// Every call to `open` is recorded, including ones that fail.
#[derive(Debug, Default)]
pub struct StaticTransport {
    bodies: HashMap<String, String>,
    fallback: Option<String>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for any URL.
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            fallback: Some(body.into()),
            ..Self::default()
        }
    }

    /// Serve `body` for exactly `url`.
    pub fn insert(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(url.into(), body.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// URLs requested so far, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }
}

impl QuoteTransport for StaticTransport {
    fn open(&self, url: &str) -> Result<Box<dyn BufRead + Send>, LoadCause> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut urls) = self.requested.lock() {
            urls.push(url.to_string());
        }

        let body = self
            .bodies
            .get(url)
            .or(self.fallback.as_ref())
            .ok_or_else(|| LoadCause::NoResponse(url.to_string()))?;
        Ok(Box::new(Cursor::new(body.clone().into_bytes())))
    }
}
