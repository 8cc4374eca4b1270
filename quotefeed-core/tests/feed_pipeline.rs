//! Integration tests for both feed pipelines using frozen response fixtures.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use quotefeed_core::data::{
    HistoryConfig, HistorySource, IntradayConfig, IntradaySource, LoadCause, QuoteSource,
    StaticTransport,
};
use quotefeed_core::domain::{HistoryRequest, IntradayRequest, OnDuplicateKey};
use quotefeed_core::{DataError, QuoteColumn, QuoteTable};
use std::path::PathBuf;
use std::sync::Arc;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    std::fs::read_to_string(path).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn intraday_source(body: String) -> (IntradaySource, Arc<StaticTransport>) {
    let transport = Arc::new(StaticTransport::with_body(body));
    let source = IntradaySource::new(&IntradayConfig::default(), transport.clone()).unwrap();
    (source, transport)
}

fn history_source(body: String) -> (HistorySource, Arc<StaticTransport>) {
    let transport = Arc::new(StaticTransport::with_body(body));
    let source = HistorySource::new(&HistoryConfig::default(), transport.clone());
    (source, transport)
}

fn ibm_request() -> HistoryRequest {
    HistoryRequest::new("IBM", date(2008, 12, 1), date(2009, 1, 31))
}

fn assert_change_identities<K: quotefeed_core::domain::TableKey>(table: &QuoteTable<K>) {
    let rows = table.rows();
    assert!(rows[0].change.is_nan());
    assert!(rows[0].change_percent.is_nan());
    for i in 1..rows.len() {
        let expected_change = rows[i].close - rows[i - 1].close;
        let expected_pct = rows[i].close / rows[i - 1].close - 1.0;
        assert!(
            (rows[i].change - expected_change).abs() < 1e-4,
            "change at {}",
            rows[i].timestamp
        );
        assert!(
            (rows[i].change_percent - expected_pct).abs() < 1e-5,
            "change percent at {}",
            rows[i].timestamp
        );
    }
}

// ── Historical ───────────────────────────────────────────────────────

#[test]
fn history_fixture_is_ascending_within_range() {
    let (source, _) = history_source(fixture("ibm_history.csv"));
    let request = ibm_request();
    let table = source.read(&request).unwrap();

    assert_eq!(table.len(), 42);
    assert!(table.is_strictly_ascending());
    assert!(table.first_key().unwrap() >= request.start);
    assert!(table.last_key().unwrap() <= request.end);
    assert_eq!(table.first_key(), Some(date(2008, 12, 1)));
    assert_eq!(table.last_key(), Some(date(2009, 1, 30)));
}

#[test]
fn history_fixture_changes_and_sanity() {
    let (source, _) = history_source(fixture("ibm_history.csv"));
    let table = source.read(&ibm_request()).unwrap();

    assert_change_identities(&table);
    for row in table.rows() {
        assert!(row.high >= row.low, "high < low at {}", row.timestamp);
        assert!(row.volume > 0.0);
    }
}

#[test]
fn history_first_row_values() {
    let (source, _) = history_source(fixture("ibm_history.csv"));
    let table = source.read(&ibm_request()).unwrap();

    let first = table.get(&date(2008, 12, 1)).unwrap();
    assert_eq!(first.open, 85.0);
    assert_eq!(first.high, 86.12);
    assert_eq!(first.low, 83.6);
    assert_eq!(first.close, 84.79);
    assert_eq!(first.volume, 11_117_575.0);
}

#[test]
fn history_single_line_example() {
    let (source, _) = history_source(
        "Date,Open,High,Low,Close,Volume\n5-Jan-09,85.3,86.1,84.9,85.9,1000000\n".into(),
    );
    let table = source
        .read(&HistoryRequest::new("IBM", date(2009, 1, 1), date(2009, 1, 31)))
        .unwrap();

    assert_eq!(table.len(), 1);
    let row = table.row(0).unwrap();
    assert_eq!(row.timestamp, date(2009, 1, 5));
    assert_eq!(row.open, 85.3);
    assert_eq!(row.volume, 1_000_000.0);
}

#[test]
fn history_parse_is_idempotent() {
    let body = fixture("ibm_history.csv");
    let (source, _) = history_source(body);
    let a = source.read(&ibm_request()).unwrap();
    let b = source.read(&ibm_request()).unwrap();

    assert_eq!(a.content_hash(), b.content_hash());
    assert_eq!(a.to_csv_string().unwrap(), b.to_csv_string().unwrap());
}

#[test]
fn history_columns_are_complete() {
    let (source, _) = history_source(fixture("ibm_history.csv"));
    let table = source.read(&ibm_request()).unwrap();
    let csv = table.to_csv_string().unwrap();
    assert!(csv.starts_with("Date,Open,High,Low,Close,Volume,Change,ChangePercent\n"));
    for column in QuoteColumn::ALL {
        assert_eq!(table.column(column).len(), table.len());
    }
}

#[test]
fn history_bad_row_discards_whole_table() {
    let mut body = fixture("ibm_history.csv");
    body.push_str("2-Dec-08,87.00,oops,86.00,86.50,100\n");
    let (source, _) = history_source(body);

    let err = source.read(&ibm_request()).unwrap_err();
    match err {
        DataError::LoadFailed { ticker, cause, .. } => {
            assert_eq!(ticker, "IBM");
            assert!(matches!(cause, LoadCause::Parse { line: 44, .. }), "{cause}");
        }
        other => panic!("expected load failure, got {other:?}"),
    }
}

#[test]
fn history_reject_policy_flags_duplicate_dates() {
    let mut body = fixture("ibm_history.csv");
    body.push_str("1-Dec-08,85.00,86.12,83.60,84.79,11117575\n");

    let transport = Arc::new(StaticTransport::with_body(body));
    let source = HistorySource::new(
        &HistoryConfig {
            on_duplicate: OnDuplicateKey::Reject,
            ..HistoryConfig::default()
        },
        transport,
    );

    let err = source.read(&ibm_request()).unwrap_err();
    assert!(matches!(
        err.cause(),
        Some(LoadCause::DuplicateKey { line: 44, .. })
    ));
}

#[test]
fn history_validation_never_fetches() {
    let (source, transport) = history_source(fixture("ibm_history.csv"));

    let reversed = HistoryRequest::new("IBM", date(2009, 1, 31), date(2008, 12, 1));
    assert!(matches!(
        source.read(&reversed),
        Err(DataError::ValidationError(_))
    ));
    let empty = HistoryRequest::new("", date(2008, 12, 1), date(2009, 1, 31));
    assert!(matches!(source.read(&empty), Err(DataError::ValidationError(_))));

    assert_eq!(transport.call_count(), 0);
}

// ── Intraday ─────────────────────────────────────────────────────────

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_time(NaiveTime::from_hms_opt(h, min, 0).unwrap())
}

#[test]
fn intraday_fixture_localizes_to_exchange_time() {
    let (source, _) = intraday_source(fixture("aapl_intraday.txt"));
    let table = source.read(&IntradayRequest::new("AAPL", 2)).unwrap();

    assert_eq!(table.len(), 48);
    assert!(table.is_strictly_ascending());
    assert_eq!(table.first_key(), Some(at(2016, 3, 2, 9, 30)));
    // Session two, tick 25.
    assert_eq!(table.last_key(), Some(at(2016, 3, 3, 9, 55)));
    // Ticks 7 and 19 are absent from the feed.
    assert!(table.get(&at(2016, 3, 2, 9, 37)).is_none());
    assert!(table.get(&at(2016, 3, 2, 9, 38)).is_some());
}

#[test]
fn intraday_fixture_changes_and_sanity() {
    let (source, _) = intraday_source(fixture("aapl_intraday.txt"));
    let table = source.read(&IntradayRequest::new("AAPL", 2)).unwrap();

    assert_change_identities(&table);
    for row in table.rows() {
        assert!(row.high >= row.low, "high < low at {}", row.timestamp);
    }
}

#[test]
fn intraday_anchor_offset_example() {
    let (source, _) = intraday_source(
        "INTERVAL=60\na1000000000,100,101,99,100.5,500\n5,101,102,100,101.5,600\n".into(),
    );
    let table = source.read(&IntradayRequest::new("AAPL", 1)).unwrap();

    let anchor = table.row(0).unwrap();
    let sample = table.row(1).unwrap();
    assert_eq!(anchor.timestamp, at(2001, 9, 8, 21, 46) + Duration::seconds(40));
    assert_eq!(sample.timestamp - anchor.timestamp, Duration::seconds(300));
    assert!((sample.change - 1.0).abs() < 1e-4);
    assert!((sample.change_percent - (101.5 / 100.5 - 1.0)).abs() < 1e-5);
}

#[test]
fn intraday_parse_is_idempotent() {
    let (source, _) = intraday_source(fixture("aapl_intraday.txt"));
    let request = IntradayRequest::new("AAPL", 2);
    let a = source.read(&request).unwrap();
    let b = source.read(&request).unwrap();
    assert_eq!(a.content_hash(), b.content_hash());
}

#[test]
fn intraday_empty_ticker_never_fetches() {
    let (source, transport) = intraday_source(fixture("aapl_intraday.txt"));
    let err = source.read(&IntradayRequest::new("", 2)).unwrap_err();
    assert!(matches!(err, DataError::ValidationError(_)));
    let err = source.read(&IntradayRequest::new("AAPL", 0)).unwrap_err();
    assert!(matches!(err, DataError::ValidationError(_)));
    assert_eq!(transport.call_count(), 0);
}

#[test]
fn intraday_zone_is_configurable() {
    let transport = Arc::new(StaticTransport::with_body(
        "INTERVAL=60\na1000000000,1,1,1,1,1\n".to_string(),
    ));
    let source = IntradaySource::new(
        &IntradayConfig {
            timezone: "UTC".into(),
            ..IntradayConfig::default()
        },
        transport,
    )
    .unwrap();

    let table = source.read(&IntradayRequest::new("AAPL", 1)).unwrap();
    assert_eq!(
        table.first_key(),
        Some(at(2001, 9, 9, 1, 46) + Duration::seconds(40))
    );
}

#[test]
fn sources_share_across_threads() {
    let (source, transport) = history_source(fixture("ibm_history.csv"));
    let source = Arc::new(source);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let source = Arc::clone(&source);
            std::thread::spawn(move || source.read(&ibm_request()).unwrap().content_hash())
        })
        .collect();
    let hashes: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(hashes.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(transport.call_count(), 4);
}
