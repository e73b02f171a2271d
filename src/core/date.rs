//! Trade date normalization

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

/// Maps `date` to the most recent business day that is not after `today`.
///
/// Future dates are clamped to `today`; weekends roll back to Friday.
/// Market holidays are not considered.
pub fn normalize_trade_date(date: NaiveDate, today: NaiveDate) -> NaiveDate {
    let date = date.min(today);
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date - Duration::days(2),
        _ => date,
    }
}

/// [`normalize_trade_date`] against the local calendar date.
pub fn normalize_to_today(date: NaiveDate) -> NaiveDate {
    normalize_trade_date(date, today())
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
