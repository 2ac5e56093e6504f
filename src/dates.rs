//! Calendar-day parsing and the request date filter.
//!
//! All comparisons happen on [`NaiveDate`] values. Timestamps carrying an offset are converted to
//! UTC before the time of day is dropped, so a request stored as `2024-03-01T23:30:00-05:00`
//! counts for 2 March.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::records::Request;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parses a backend date into a UTC calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS[.fff]` timestamps
/// (read as UTC). Returns `None` for anything else.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(day) = NaiveDate::parse_from_str(value, DAY_FORMAT) {
        return Some(day);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|timestamp| timestamp.date())
}

/// An inclusive span of calendar days.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Creates a range; a missing end makes it a single day.
    ///
    /// Returns `None` when the end precedes the start.
    pub fn new(from: NaiveDate, to: Option<NaiveDate>) -> Option<Self> {
        let to = to.unwrap_or(from);
        (from <= to).then_some(Self { from, to })
    }

    /// A range covering exactly one day.
    pub fn single(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Whether `day` lies within the range, both ends inclusive.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }

    /// Whether the two ranges share at least one day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.from <= other.to && other.from <= self.to
    }
}

/// Returns the requests active on `day`, keeping their input order.
pub fn active_on<'a, I>(requests: I, day: NaiveDate) -> Vec<&'a Request>
where
    I: IntoIterator<Item = &'a Request>,
{
    requests
        .into_iter()
        .filter(|request| request.range().contains(day))
        .collect()
}

/// Returns the requests whose dates intersect `range`, keeping their input order.
pub fn overlapping<'a, I>(requests: I, range: &DateRange) -> Vec<&'a Request>
where
    I: IntoIterator<Item = &'a Request>,
{
    requests
        .into_iter()
        .filter(|request| request.range().overlaps(range))
        .collect()
}

/// Formats a day as `YYYY-MM-DD`.
pub fn iso_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Formats a day the way the reports print it, `DD/MM/YYYY`.
pub fn display_day(day: NaiveDate) -> String {
    day.format("%d/%m/%Y").to_string()
}
