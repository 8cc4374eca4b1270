//! URL template substitution.

use crate::domain::{HistoryRequest, IntradayRequest};
use chrono::NaiveDate;

/// Date form the historical endpoint expects, e.g. `Jan+01%2C+2006`.
const HISTORY_DATE_FORMAT: &str = "%b+%d%%2C+%Y";

pub fn render_intraday_url(template: &str, request: &IntradayRequest) -> String {
    template
        .replace("<TICKER>", &urlencoding::encode(request.ticker.trim()))
        .replace("<DAYS>", &request.day_count.to_string())
}

pub fn render_history_url(template: &str, request: &HistoryRequest) -> String {
    template
        .replace("<TICKER>", &urlencoding::encode(request.ticker.trim()))
        .replace("<START>", &format_history_date(request.start))
        .replace("<END>", &format_history_date(request.end))
}

fn format_history_date(date: NaiveDate) -> String {
    date.format(HISTORY_DATE_FORMAT).to_string()
}
