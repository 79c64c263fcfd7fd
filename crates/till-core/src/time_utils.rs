use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Result, TillError};

// ── Store formats ─────────────────────────────────────────────────────────────

/// Calendar date column format, `2024-03-01`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Clock time column format, `09:00:00`.
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Sale timestamp format, minute precision, `2024-03-01 10:15`.
pub const SALE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Full timestamp used on movement receipts, `2024-03-01 10:15:42`.
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse a store date column.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| TillError::TimestampParse(s.to_string()))
}

/// Parse a store clock-time column (`HH:MM:SS`).
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
        .map_err(|_| TillError::TimestampParse(s.to_string()))
}

/// Parse a user-supplied clock time, accepting `HH:MM:SS` or `HH:MM`.
pub fn parse_clock_time(s: &str) -> Result<NaiveTime> {
    const FMTS: &[&str] = &["%H:%M:%S", "%H:%M"];
    let trimmed = s.trim();
    for fmt in FMTS {
        if let Ok(t) = NaiveTime::parse_from_str(trimmed, fmt) {
            return Ok(t);
        }
    }
    Err(TillError::TimestampParse(s.to_string()))
}

/// Parse a minute-precision sale timestamp.
pub fn parse_sale_timestamp(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), SALE_TIMESTAMP_FORMAT)
        .map_err(|_| TillError::TimestampParse(s.to_string()))
}

// ── Shift arithmetic ──────────────────────────────────────────────────────────

/// Elapsed whole minutes of a shift that clocked in at `date clock_in` and
/// out at `clock_out` on the same calendar date.
///
/// A clock-out numerically earlier than the clock-in means the shift crossed
/// midnight; 24 hours are added to the close instant before subtracting.
/// Seconds are truncated, not rounded.
pub fn shift_minutes(date: NaiveDate, clock_in: NaiveTime, clock_out: NaiveTime) -> i64 {
    let start = date.and_time(clock_in);
    let mut end = date.and_time(clock_out);
    if end < start {
        end += Duration::hours(24);
    }
    (end - start).num_minutes()
}

/// Convert whole minutes to decimal hours (450 → 7.5). Not rounded.
pub fn minutes_to_hours(minutes: i64) -> f64 {
    minutes as f64 / 60.0
}

// ── Tests ─────────────────────────────────────────────────────────────────────
