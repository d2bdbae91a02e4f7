//! Conversion from the reader's timestamp epoch to wall-clock time.
//!
//! The reader stores creation dates as floating-point seconds since
//! 2001-01-01T00:00:00Z. Adding [`READER_EPOCH_OFFSET`] yields Unix seconds.

use chrono::{DateTime, Local, NaiveDateTime};

use crate::config::TimeZoneMode;

/// Seconds between 1970-01-01T00:00:00Z and 2001-01-01T00:00:00Z.
pub const READER_EPOCH_OFFSET: f64 = 978_307_200.0;

/// Convert a raw reader timestamp into wall-clock time in `zone`.
///
/// Returns `None` for missing, NaN, infinite or out-of-range values.
#[must_use]
pub fn convert_timestamp(raw: Option<f64>, zone: TimeZoneMode) -> Option<NaiveDateTime> {
    let unix = raw? + READER_EPOCH_OFFSET;
    if !unix.is_finite() {
        return None;
    }

    let secs = unix.floor();
    if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return None;
    }
    // Microsecond precision, the same resolution the reader writes.
    let micros = ((unix - secs) * 1_000_000.0).round() as u32;
    let utc = DateTime::from_timestamp(secs as i64, micros.min(999_999) * 1_000)?;

    Some(match zone {
        TimeZoneMode::Utc => utc.naive_utc(),
        TimeZoneMode::Local => utc.with_timezone(&Local).naive_local(),
    })
}
