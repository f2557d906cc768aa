//! Conversion between [OffsetDateTime] and the Unix-millisecond integers
//! stored in the database.
//!
//! Instants are stored as UTC milliseconds so that range comparisons and
//! SQLite's `strftime` day/month grouping are exact regardless of the
//! sub-second precision a client sends.

use time::OffsetDateTime;

use crate::Error;

/// Convert a date-time to Unix milliseconds, truncating sub-millisecond
/// precision.
pub(crate) fn to_unix_ms(date_time: OffsetDateTime) -> i64 {
    (date_time.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Convert Unix milliseconds back to a UTC date-time.
///
/// # Errors
/// Returns [Error::SqlError] wrapping an integer-out-of-range error if the
/// stored value does not represent a valid instant. This only happens if the
/// database was modified outside the application.
pub(crate) fn from_unix_ms(milliseconds: i64) -> Result<OffsetDateTime, Error> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(milliseconds) * 1_000_000).map_err(|_| {
        Error::SqlError(rusqlite::Error::IntegralValueOutOfRange(0, milliseconds))
    })
}

#[cfg(test)]
mod timestamp_tests {
    use time::macros::datetime;

    use super::{from_unix_ms, to_unix_ms};

    #[test]
    fn round_trips_instants() {
        let instant = datetime!(2024-03-10 23:59:59.999 UTC);

        let milliseconds = to_unix_ms(instant);
        let got = from_unix_ms(milliseconds).unwrap();

        assert_eq!(got, instant);
    }

    #[test]
    fn unix_epoch_is_zero() {
        assert_eq!(to_unix_ms(datetime!(1970-01-01 00:00 UTC)), 0);
    }

    #[test]
    fn truncates_sub_millisecond_precision() {
        let instant = datetime!(2024-03-10 12:00:00.123456 UTC);

        let milliseconds = to_unix_ms(instant);

        assert_eq!(
            from_unix_ms(milliseconds).unwrap(),
            datetime!(2024-03-10 12:00:00.123 UTC)
        );
    }
}
