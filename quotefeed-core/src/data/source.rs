//! Feed sources: validate, fetch, parse, and wrap failures with the ticker.
//!
//! A source holds only immutable configuration (URL template, zone, duplicate
//! policy) plus a shared transport, so one instance can serve concurrent,
//! independent calls. Each `read` is a single blocking fetch-then-parse.

use super::config::{FeedConfig, HistoryConfig, IntradayConfig};
use super::error::{ConfigError, DataError, LoadCause};
use super::history::parse_history;
use super::intraday::parse_intraday;
use super::request::{render_history_url, render_intraday_url};
use super::transport::{HttpTransport, QuoteTransport};
use crate::domain::{
    FeedKind, FeedRequest, HistoryRequest, IntradayRequest, OnDuplicateKey, QuoteTable, TableKey,
};
use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use log::info;
use std::sync::Arc;

/// A feed that turns a request into a finished quote table.
pub trait QuoteSource: Send + Sync {
    type Request: FeedRequest;
    type Key: TableKey;

    fn feed(&self) -> FeedKind;

    /// Validate, fetch and parse. Either a fully built, ordered table or an error.
    fn read(&self, request: &Self::Request) -> Result<QuoteTable<Self::Key>, DataError>;
}

/// Intraday minute-bar source.
pub struct IntradaySource {
    url_template: String,
    tz: Tz,
    on_duplicate: OnDuplicateKey,
    transport: Arc<dyn QuoteTransport>,
}

impl IntradaySource {
    pub fn new(
        config: &IntradayConfig,
        transport: Arc<dyn QuoteTransport>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            url_template: config.url_template.clone(),
            tz: config.tz()?,
            on_duplicate: config.on_duplicate,
            transport,
        })
    }

    /// Source over HTTP using the `[intraday]` and `[http]` sections.
    pub fn from_config(config: &FeedConfig) -> Result<Self, ConfigError> {
        let transport = Arc::new(HttpTransport::new(&config.http)?);
        Self::new(&config.intraday, transport)
    }

    pub fn url_for(&self, request: &IntradayRequest) -> String {
        render_intraday_url(&self.url_template, request)
    }
}

impl QuoteSource for IntradaySource {
    type Request = IntradayRequest;
    type Key = NaiveDateTime;

    fn feed(&self) -> FeedKind {
        FeedKind::Intraday
    }

    fn read(&self, request: &IntradayRequest) -> Result<QuoteTable<NaiveDateTime>, DataError> {
        request.validate()?;
        let url = self.url_for(request);
        let wrap = |cause: LoadCause| DataError::load(&request.ticker, FeedKind::Intraday, cause);

        let reader = self.transport.open(&url).map_err(wrap)?;
        let table = parse_intraday(reader, self.tz, self.on_duplicate).map_err(wrap)?;

        info!(
            "{}: loaded {} intraday quotes over {} day(s)",
            request.ticker,
            table.len(),
            request.day_count
        );
        Ok(table)
    }
}

/// Historical end-of-day source.
pub struct HistorySource {
    url_template: String,
    on_duplicate: OnDuplicateKey,
    transport: Arc<dyn QuoteTransport>,
}

impl HistorySource {
    pub fn new(config: &HistoryConfig, transport: Arc<dyn QuoteTransport>) -> Self {
        Self {
            url_template: config.url_template.clone(),
            on_duplicate: config.on_duplicate,
            transport,
        }
    }

    /// Source over HTTP using the `[history]` and `[http]` sections.
    pub fn from_config(config: &FeedConfig) -> Result<Self, ConfigError> {
        let transport = Arc::new(HttpTransport::new(&config.http)?);
        Ok(Self::new(&config.history, transport))
    }

    pub fn url_for(&self, request: &HistoryRequest) -> String {
        render_history_url(&self.url_template, request)
    }
}

impl QuoteSource for HistorySource {
    type Request = HistoryRequest;
    type Key = NaiveDate;

    fn feed(&self) -> FeedKind {
        FeedKind::Historical
    }

    fn read(&self, request: &HistoryRequest) -> Result<QuoteTable<NaiveDate>, DataError> {
        request.validate()?;
        let url = self.url_for(request);
        let wrap = |cause: LoadCause| DataError::load(&request.ticker, FeedKind::Historical, cause);

        let reader = self.transport.open(&url).map_err(wrap)?;
        let table = parse_history(reader, self.on_duplicate).map_err(wrap)?;

        info!(
            "{}: loaded {} historical quotes ({} to {})",
            request.ticker,
            table.len(),
            request.start,
            request.end
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::transport::StaticTransport;

    fn intraday_source(transport: Arc<StaticTransport>) -> IntradaySource {
        IntradaySource::new(&IntradayConfig::default(), transport).unwrap()
    }

    #[test]
    fn validation_happens_before_fetch() {
        let transport = Arc::new(StaticTransport::with_body("INTERVAL=60\n"));
        let source = intraday_source(transport.clone());

        let err = source.read(&IntradayRequest::new("", 3)).unwrap_err();
        assert!(matches!(err, DataError::ValidationError(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn intraday_read_hits_rendered_url() {
        let transport = Arc::new(StaticTransport::with_body(
            "INTERVAL=60\na1000000000,1,2,0.5,1.5,10\n1,1,2,0.5,1.6,10\n",
        ));
        let source = intraday_source(transport.clone());

        let table = source.read(&IntradayRequest::new("MSFT", 2)).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            transport.requested_urls(),
            vec![source.url_for(&IntradayRequest::new("MSFT", 2))]
        );
        assert!(transport.requested_urls()[0].ends_with("p=2d&f=d,o,h,l,c,v&df=cpct&q=MSFT"));
    }

    #[test]
    fn parse_failure_is_wrapped_with_ticker() {
        let transport = Arc::new(StaticTransport::with_body("5-Jan-09,x,1,1,1,1\n"));
        let source = HistorySource::new(&HistoryConfig::default(), transport);
        let request = HistoryRequest::new(
            "GE",
            NaiveDate::from_ymd_opt(2009, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2009, 2, 1).unwrap(),
        );

        match source.read(&request).unwrap_err() {
            DataError::LoadFailed { ticker, feed, cause } => {
                assert_eq!(ticker, "GE");
                assert_eq!(feed, FeedKind::Historical);
                assert!(matches!(cause, LoadCause::Parse { line: 1, .. }));
            }
            other => panic!("expected load failure, got {other:?}"),
        }
    }

    #[test]
    fn fetch_failure_is_wrapped_with_ticker() {
        let source = intraday_source(Arc::new(StaticTransport::new()));
        let err = source.read(&IntradayRequest::new("C", 1)).unwrap_err();
        assert!(err.cause().is_some_and(|c| c.is_fetch_error()));
        assert_eq!(err.to_string(), "failed to load intraday quotes for C");
    }

    #[test]
    fn sources_are_send_and_sync() {
        fn require<T: Send + Sync>() {}
        require::<IntradaySource>();
        require::<HistorySource>();
    }
}
