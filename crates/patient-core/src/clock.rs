use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

/// Current UTC time, truncated to microsecond precision.
///
/// Stores keep timestamps at microsecond resolution, so truncating here keeps
/// a freshly built record equal to the one read back from any backend.
pub fn now_utc() -> OffsetDateTime {
    truncate_to_micros(OffsetDateTime::now_utc())
}

/// Current UTC calendar date.
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Formats a date as `YYYYMMDD`.
pub fn date_stamp(date: Date) -> String {
    let format = format_description!("[year][month][day]");
    date.format(format).unwrap_or_else(|_| {
        format!(
            "{:04}{:02}{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        )
    })
}

/// Returns the `updated_at` value for a mutation of a row last touched at
/// `previous`: `candidate`, unless that would not move strictly forward.
pub fn next_update_timestamp(previous: OffsetDateTime, candidate: OffsetDateTime) -> OffsetDateTime {
    let floor = previous + Duration::microseconds(1);
    truncate_to_micros(candidate.max(floor))
}

fn truncate_to_micros(dt: OffsetDateTime) -> OffsetDateTime {
    let micros = dt.nanosecond() / 1_000 * 1_000;
    dt.replace_nanosecond(micros).unwrap_or(dt)
}
