//! Calendar dates, times of day, and the instant composed from both.
//!
//! Everything here is time-zone-naive: a meet-up at "06:00 PM" means six in
//! the evening on whatever wall clock the device is showing.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Wire format of a calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format of a time of day, e.g. `06:00 PM`.
pub const TIME_FORMAT: &str = "%I:%M %p";

/// A time of day with minute precision, written as `hh:mm AM/PM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Build from a 24-hour clock reading. Returns None for out-of-range values.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(TimeOfDay)
    }

    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let time = NaiveTime::parse_from_str(s, TIME_FORMAT)
            .map_err(|_| ParseError::Time(s.to_string()))?;
        Ok(TimeOfDay(time))
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }

    /// Hour on the 12-hour dial, 1..=12.
    pub fn hour12(&self) -> u32 {
        self.0.hour12().1
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn is_pm(&self) -> bool {
        self.0.hour12().0
    }
}

impl From<NaiveTime> for TimeOfDay {
    /// Truncates to the minute.
    fn from(time: NaiveTime) -> Self {
        TimeOfDay(NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format(TIME_FORMAT))
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeOfDay::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        TimeOfDay::parse(&s)
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

/// Combine a calendar date and a time of day into one comparable instant.
pub fn compose(date: NaiveDate, time: TimeOfDay) -> NaiveDateTime {
    date.and_time(time.0)
}

/// Like [`compose`], for a time of day that is still raw text.
pub fn compose_str(date: NaiveDate, time: &str) -> Result<NaiveDateTime, ParseError> {
    Ok(compose(date, TimeOfDay::parse(time)?))
}

/// Strict ordering: an instant is never before itself.
pub fn is_before(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a < b
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse `YYYY-MM-DD`. Only the canonical zero-padded form is accepted, so
/// `format_date(parse_date(s)?) == s` always holds.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    let date =
        NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| ParseError::Date(s.to_string()))?;

    if format_date(date) != s {
        return Err(ParseError::Date(s.to_string()));
    }

    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_afternoon_time() {
        let time = TimeOfDay::parse("06:00 PM").unwrap();
        assert_eq!(time.as_naive(), NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(time.hour12(), 6);
        assert!(time.is_pm());
    }

    #[test]
    fn midnight_and_noon() {
        let midnight = TimeOfDay::parse("12:00 AM").unwrap();
        let noon = TimeOfDay::parse("12:00 PM").unwrap();
        assert_eq!(midnight.as_naive(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(noon.as_naive(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn displays_zero_padded() {
        let time = TimeOfDay::from_hm(9, 5).unwrap();
        assert_eq!(time.to_string(), "09:05 AM");
        assert_eq!(TimeOfDay::from_hm(23, 59).unwrap().to_string(), "11:59 PM");
    }

    #[test]
    fn display_parses_back_to_same_time() {
        for (h, m) in [(0, 0), (7, 30), (12, 1), (18, 0), (23, 59)] {
            let time = TimeOfDay::from_hm(h, m).unwrap();
            assert_eq!(TimeOfDay::parse(&time.to_string()).unwrap(), time);
        }
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["", "18:00", "13:00 PM", "06:61 PM", "noon", "06:00:00 PM"] {
            assert_eq!(
                TimeOfDay::parse(bad),
                Err(ParseError::Time(bad.to_string())),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn from_naive_time_drops_seconds() {
        let time = TimeOfDay::from(NaiveTime::from_hms_opt(18, 30, 45).unwrap());
        assert_eq!(time.to_string(), "06:30 PM");
    }

    #[test]
    fn compose_combines_date_and_time() {
        let instant = compose_str(date(2025, 3, 20), "06:00 PM").unwrap();
        assert_eq!(instant, date(2025, 3, 20).and_hms_opt(18, 0, 0).unwrap());
    }

    #[test]
    fn compose_str_reports_bad_time() {
        assert!(matches!(
            compose_str(date(2025, 3, 20), "six"),
            Err(ParseError::Time(_))
        ));
    }

    #[test]
    fn is_before_is_strict() {
        let a = date(2025, 3, 20).and_hms_opt(18, 0, 0).unwrap();
        let b = date(2025, 3, 20).and_hms_opt(18, 1, 0).unwrap();
        assert!(is_before(a, b));
        assert!(!is_before(b, a));
        assert!(!is_before(a, a));
    }

    #[test]
    fn date_round_trip() {
        for s in ["2025-03-20", "0999-01-01", "2024-02-29", "9999-12-31"] {
            assert_eq!(format_date(parse_date(s).unwrap()), s);
        }
    }

    #[test]
    fn rejects_non_canonical_dates() {
        for bad in ["2025-3-20", "20-03-2025", "2025-02-30", "tomorrow", ""] {
            assert!(parse_date(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn serializes_as_wire_string() {
        let time = TimeOfDay::from_hm(18, 0).unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"06:00 PM\"");
        let back: TimeOfDay = serde_json::from_str("\"06:00 PM\"").unwrap();
        assert_eq!(back, time);
        assert!(serde_json::from_str::<TimeOfDay>("\"18:00\"").is_err());
    }
}
