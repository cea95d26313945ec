// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{DateTime, Days, Duration, LocalResult, NaiveTime, SecondsFormat, TimeZone, Utc};

/// Offset past midnight at which the daily refresh fires, so the API already
/// reports the new (empty) day.
pub const MIDNIGHT_OFFSET_SECS: i64 = 1;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current Unix time in whole seconds.
pub fn unix_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// The next `00:00:01` strictly after `now`, in `now`'s time zone.
///
/// If midnight does not exist on that date (a DST jump at 00:00), the first
/// valid instant after the gap is used.
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let trigger = NaiveTime::MIN + Duration::seconds(MIDNIGHT_OFFSET_SECS);

    let today = now.date_naive();
    let mut date = if now.time() < trigger {
        today
    } else {
        today.checked_add_days(Days::new(1)).unwrap_or(today)
    };

    loop {
        let naive = date.and_time(trigger);
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => {
                // Skip forward an hour at a time out of the gap
                let shifted = naive + Duration::hours(1);
                if let LocalResult::Single(dt) = tz.from_local_datetime(&shifted) {
                    return dt;
                }
                date = date.checked_add_days(Days::new(1)).unwrap_or(date);
            }
        }
    }
}

/// Time left until the next daily refresh.
pub fn until_next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> std::time::Duration {
    (next_midnight(now) - now.clone())
        .to_std()
        .unwrap_or_default()
}
