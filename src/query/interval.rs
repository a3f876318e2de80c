use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::error::ConversionError;

/// Half-open time range `[start, end)`, written on the wire as `start/end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn parse(text: &str) -> Result<Self, ConversionError> {
        let (start, end) = text
            .split_once('/')
            .ok_or_else(|| ConversionError::InvalidInterval(text.to_string()))?;
        let start = parse_instant(start).ok_or_else(|| ConversionError::InvalidInterval(text.to_string()))?;
        let end = parse_instant(end).ok_or_else(|| ConversionError::InvalidInterval(text.to_string()))?;
        if end < start {
            return Err(ConversionError::InvalidInterval(text.to_string()));
        }
        Ok(Self { start, end })
    }
}

// Instants are normalized to UTC wall-clock time.
fn parse_instant(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl TryFrom<String> for Interval {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Interval::parse(&value)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start.format("%Y-%m-%dT%H:%M:%S"), self.end.format("%Y-%m-%dT%H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn parses_rfc3339_and_normalizes_to_utc() {
        let interval = Interval::parse("2024-01-01T00:00:00Z/2024-01-02T03:00:00+01:00").unwrap();
        assert_eq!(interval.start, at(2024, 1, 1, 0));
        assert_eq!(interval.end, at(2024, 1, 2, 2));
    }

    #[test]
    fn parses_bare_dates() {
        let interval = Interval::parse("2024-01-01/2024-02-01").unwrap();
        assert_eq!(interval, Interval::new(at(2024, 1, 1, 0), at(2024, 2, 1, 0)));
        assert_eq!(interval.to_string(), "2024-01-01T00:00:00/2024-02-01T00:00:00");
    }

    #[test]
    fn rejects_malformed_and_reversed_intervals() {
        assert!(matches!(Interval::parse("2024-01-01"), Err(ConversionError::InvalidInterval(_))));
        assert!(matches!(Interval::parse("yesterday/today"), Err(ConversionError::InvalidInterval(_))));
        assert!(matches!(Interval::parse("2024-02-01/2024-01-01"), Err(ConversionError::InvalidInterval(_))));
    }

    #[test]
    fn deserializes_from_string() {
        let intervals: Vec<Interval> = serde_json::from_str(r#"["2024-01-01/2024-01-08"]"#).unwrap();
        assert_eq!(intervals[0].end, at(2024, 1, 8, 0));
        assert!(serde_json::from_str::<Vec<Interval>>(r#"["nope"]"#).is_err());
    }
}
