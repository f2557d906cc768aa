//! Date-range helpers for transaction filters and analytics windows.
//!
//! Date filters from the query string are lenient: a value that parses as a
//! calendar date or an RFC 3339 instant narrows the window, anything else is
//! ignored so the request still succeeds.

use time::{
    Date, Duration, Month, OffsetDateTime, Time, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

/// Calendar date format for query string filters, e.g. "2024-03-10".
const CALENDAR_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]");

/// A half-open window of time: `start <= t < end_exclusive`.
///
/// Either bound may be absent, in which case the window is open on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateWindow {
    /// The inclusive lower bound.
    pub start: Option<OffsetDateTime>,
    /// The exclusive upper bound.
    pub end_exclusive: Option<OffsetDateTime>,
}

impl DateWindow {
    /// A window that matches every instant.
    pub const UNBOUNDED: Self = Self {
        start: None,
        end_exclusive: None,
    };
}

/// The relative date-range presets a client can ask for instead of explicit
/// bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangePreset {
    /// The current calendar day.
    Today,
    /// The last seven calendar days including today.
    Week,
    /// The current calendar month up to today.
    Month,
}

impl DateRangePreset {
    /// Parse a preset label, ignoring case. Returns [None] for unknown labels.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "today" => Some(Self::Today),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }

    /// The window the preset covers, anchored at `now`.
    ///
    /// All presets end at the midnight following `now`, so "today" is the
    /// half-open interval from this morning's midnight to tomorrow's.
    pub fn window(self, now: OffsetDateTime) -> DateWindow {
        let start = match self {
            Self::Today => start_of_day(now),
            Self::Week => start_of_day(now - Duration::days(6)),
            Self::Month => first_instant_of_month(now.date()),
        };

        DateWindow {
            start: Some(start),
            end_exclusive: Some(next_midnight(now)),
        }
    }
}

/// Resolve the date filter parameters of a list request into a window.
///
/// A present `date_range` takes precedence over `from`/`to`, even when its
/// label is unknown, except for "custom" which behaves like explicit bounds.
/// `from` and `to` cover whole days: the window runs from the midnight
/// starting `from` to the midnight after `to`. Unparseable bounds are
/// dropped rather than rejected.
pub fn resolve_window(
    date_range: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    now: OffsetDateTime,
) -> DateWindow {
    match date_range {
        Some(label) if label.eq_ignore_ascii_case("custom") => DateWindow {
            start: from.and_then(parse_date_filter).map(start_of_day),
            end_exclusive: to.and_then(parse_date_filter).map(next_midnight),
        },
        Some(label) => match DateRangePreset::from_label(label) {
            Some(preset) => preset.window(now),
            None => {
                tracing::debug!("ignoring unknown date range preset {label:?}");
                DateWindow::UNBOUNDED
            }
        },
        // Both bounds are days: the window runs from the midnight starting
        // `from` to the midnight after `to`.
        None => DateWindow {
            start: from.and_then(parse_date_filter).map(start_of_day),
            end_exclusive: to.and_then(parse_date_filter).map(next_midnight),
        },
    }
}

/// Parse a date filter value from the query string.
///
/// Accepts a calendar date ("2024-03-10", taken as UTC midnight) or an
/// RFC 3339 instant. Returns [None] for anything else.
pub fn parse_date_filter(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(date) = Date::parse(raw, CALENDAR_DATE_FORMAT) {
        return Some(date.midnight().assume_utc());
    }

    if let Ok(date_time) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(date_time);
    }

    tracing::debug!("ignoring unparseable date filter {raw:?}");

    None
}

/// The midnight at the start of `date_time`'s day.
pub fn start_of_day(date_time: OffsetDateTime) -> OffsetDateTime {
    date_time.replace_time(Time::MIDNIGHT)
}

/// The midnight following `date_time`, i.e. the exclusive end of its day.
pub fn next_midnight(date_time: OffsetDateTime) -> OffsetDateTime {
    start_of_day(date_time) + Duration::days(1)
}

/// The first instant of the calendar month containing `date`.
pub fn first_instant_of_month(date: Date) -> OffsetDateTime {
    first_of_month(date).midnight().assume_utc()
}

/// The first instant of the calendar month `months` before the one
/// containing `date`.
pub fn month_window_start(date: Date, months: u32) -> OffsetDateTime {
    let mut year = date.year();
    let mut month = date.month();

    for _ in 0..months {
        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }

    Date::from_calendar_date(year, month, 1)
        .expect("invalid month start date")
        .midnight()
        .assume_utc()
}

fn first_of_month(date: Date) -> Date {
    Date::from_calendar_date(date.year(), date.month(), 1).expect("invalid month start date")
}

/// Three-letter English abbreviation for `month`, used in display labels.
pub(crate) fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
