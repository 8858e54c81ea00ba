//! Exchange trading calendar.
//!
//! All session-boundary math happens in exchange-local time
//! (America/New_York) so DST transitions are handled by `chrono-tz`.
//! The regular session is the half-open interval 09:30 ≤ t < 16:00.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Exchange time zone.
pub const EXCHANGE_TZ: Tz = chrono_tz::America::New_York;

/// Session open, seconds after local midnight (09:30).
pub const SESSION_OPEN_SECS: u32 = 9 * 3600 + 30 * 60;

/// Session close, seconds after local midnight (16:00).
pub const SESSION_CLOSE_SECS: u32 = 16 * 3600;

/// Convert a UTC instant to exchange-local time.
#[must_use]
pub fn exchange_time(ts: DateTime<Utc>) -> DateTime<Tz> {
    ts.with_timezone(&EXCHANGE_TZ)
}

/// Exchange-local calendar date of an instant.
#[must_use]
pub fn exchange_date(ts: DateTime<Utc>) -> NaiveDate {
    exchange_time(ts).date_naive()
}

/// Whether `ts` falls inside the regular session of `date`.
#[must_use]
pub fn is_regular_session(ts: DateTime<Utc>, date: NaiveDate) -> bool {
    let local = exchange_time(ts);
    let secs = local.num_seconds_from_midnight();
    local.date_naive() == date && (SESSION_OPEN_SECS..SESSION_CLOSE_SECS).contains(&secs)
}

/// Whether `ts` is strictly before the session open of `date`.
#[must_use]
pub fn is_before_session(ts: DateTime<Utc>, date: NaiveDate) -> bool {
    let local = exchange_time(ts);
    let local_date = local.date_naive();
    local_date < date || (local_date == date && local.num_seconds_from_midnight() < SESSION_OPEN_SECS)
}

/// Hours from `now` until 16:00 exchange-local on the same local date.
///
/// Negative after the close.
#[must_use]
pub fn hours_to_close(now: DateTime<Utc>) -> f64 {
    let local = exchange_time(now);
    let elapsed =
        f64::from(local.num_seconds_from_midnight()) + f64::from(local.nanosecond()) / 1e9;
    (f64::from(SESSION_CLOSE_SECS) - elapsed) / 3600.0
}

/// UTC instant of the 16:00 close on `date`.
#[must_use]
pub fn session_close_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    let close = NaiveTime::from_num_seconds_from_midnight_opt(SESSION_CLOSE_SECS, 0)?;
    EXCHANGE_TZ
        .from_local_datetime(&date.and_time(close))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// ACT/365 year fraction between two instants.
#[must_use]
pub fn year_fraction_act_365(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / (365.0 * 24.0 * 3600.0 * 1000.0)
}
