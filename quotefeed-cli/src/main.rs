//! quotefeed CLI: fetch intraday and historical quote tables.
//!
//! Commands:
//! - `intraday`: minute bars for the last N trading days, keyed by exchange-local time
//! - `history`: daily bars between two dates
//!
//! Each ticker is fetched independently; failures are reported per ticker
//! and the process exits non-zero if any ticker failed.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::info;
use quotefeed_core::data::{fetch_all, BatchSummary, FeedConfig, LogProgress};
use quotefeed_core::domain::TableKey;
use quotefeed_core::{HistoryRequest, HistorySource, IntradayRequest, IntradaySource, QuoteTable};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "quotefeed",
    about = "quotefeed CLI: intraday and end-of-day quote downloads"
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OutputArgs {
    /// Write one `<TICKER>.csv` per table into this directory.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Number of trailing rows to print per table.
    #[arg(long, global = true, default_value_t = 5)]
    tail: usize,

    /// Also write `<TICKER>.json` next to each CSV.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch intraday minute bars.
    Intraday {
        /// Tickers to fetch (e.g., AAPL MSFT).
        #[arg(required = true)]
        tickers: Vec<String>,

        /// Number of trading days to request.
        #[arg(long, default_value_t = 1)]
        days: u32,
    },
    /// Fetch historical daily bars.
    History {
        /// Tickers to fetch (e.g., IBM GE).
        #[arg(required = true)]
        tickers: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to one year ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            let config = FeedConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            info!("config loaded from {}", path.display());
            config
        }
        None => FeedConfig::default(),
    };

    let all_ok = match cli.command {
        Commands::Intraday { tickers, days } => run_intraday(&config, tickers, days, &cli.output)?,
        Commands::History {
            tickers,
            start,
            end,
        } => run_history(&config, tickers, start, end, &cli.output)?,
    };

    if !all_ok {
        std::process::exit(1);
    }
    Ok(())
}

fn run_intraday(
    config: &FeedConfig,
    tickers: Vec<String>,
    days: u32,
    output: &OutputArgs,
) -> Result<bool> {
    let source = IntradaySource::from_config(config)?;
    let requests: Vec<IntradayRequest> = tickers
        .into_iter()
        .map(|t| IntradayRequest::new(t, days))
        .collect();

    let summary = fetch_all(&source, &requests, &LogProgress);
    report(&summary, output)
}

fn run_history(
    config: &FeedConfig,
    tickers: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    output: &OutputArgs,
) -> Result<bool> {
    let end_date =
        parse_date(end.as_deref())?.unwrap_or_else(|| chrono::Local::now().date_naive());
    let start_date =
        parse_date(start.as_deref())?.unwrap_or_else(|| end_date - chrono::Duration::days(365));

    let source = HistorySource::from_config(config)?;
    let requests: Vec<HistoryRequest> = tickers
        .into_iter()
        .map(|t| HistoryRequest::new(t, start_date, end_date))
        .collect();

    let summary = fetch_all(&source, &requests, &LogProgress);
    report(&summary, output)
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
    })
    .transpose()
}

/// Print each table's tail, write CSVs if asked, and list errors. Returns
/// whether every ticker succeeded.
fn report<K: TableKey + Serialize>(
    summary: &BatchSummary<K>,
    output: &OutputArgs,
) -> Result<bool> {
    for (ticker, table) in &summary.tables {
        print_tail(ticker, table, output.tail);
        if let Some(dir) = &output.output_dir {
            let path = write_table(dir, ticker, table)?;
            println!("Saved to: {}", path.display());
            if output.json {
                let path = path.with_extension("json");
                std::fs::write(&path, table.to_json_string()?)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Saved to: {}", path.display());
            }
        }
    }

    for (ticker, err) in &summary.errors {
        eprintln!("Error for {ticker}: {err}");
        if let Some(cause) = err.cause() {
            eprintln!("  caused by: {cause}");
        }
    }

    Ok(summary.all_succeeded())
}

fn print_tail<K: TableKey>(ticker: &str, table: &QuoteTable<K>, tail: usize) {
    println!();
    println!("=== {ticker} ({} rows) ===", table.len());
    if let (Some(first), Some(last)) = (table.first_key(), table.last_key()) {
        println!("Range:      {first} .. {last}");
    }
    if tail == 0 {
        return;
    }
    println!(
        "{:<20} {:>10} {:>10} {:>10} {:>10} {:>12} {:>9} {:>9}",
        "Date", "Open", "High", "Low", "Close", "Volume", "Change", "Change%"
    );
    let skip = table.len().saturating_sub(tail);
    for row in &table.rows()[skip..] {
        println!(
            "{:<20} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12.0} {:>9.2} {:>8.2}%",
            row.timestamp.to_string(),
            row.open,
            row.high,
            row.low,
            row.close,
            row.volume,
            row.change,
            row.change_percent * 100.0
        );
    }
}

fn write_table<K: TableKey>(dir: &Path, ticker: &str, table: &QuoteTable<K>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    let path = dir.join(format!("{}.csv", file_stem(ticker)));
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    table.write_csv(BufWriter::new(file))?;
    Ok(path)
}

/// Tickers like `NASDAQ:AAPL` are not valid file names everywhere.
fn file_stem(ticker: &str) -> String {
    ticker
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}
