//! See [`Timestamp`] and [`TimeInterval`]

use crate::data::ValidationError;
use chrono::prelude::*;
use serde::{Deserialize, Serialize, de::Visitor};
use thiserror::Error;

/// A point in time, always UTC.
///
/// Parsed leniently: RFC 3339 (`2024-06-01T10:00:00Z`), or the naive forms a
/// browser `datetime-local` input produces (`2024-06-01T10:00`,
/// `2024-06-01T10:00:00`), or a bare date (`2024-06-01`). Naive forms are
/// taken to be UTC.
///
/// Always written as RFC 3339. Fractional seconds are written only when present,
/// so a written timestamp parses back to the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub DateTime<Utc>);

/// Error while parsing a [`Timestamp`] from a string.
#[derive(Debug, Error)]
#[error("`{0}` is not a recognized timestamp (expected RFC 3339 or YYYY-MM-DDTHH:MM)")]
pub struct ParseTimestampError(String);

impl std::str::FromStr for Timestamp {
    type Err = ParseTimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }
        if let Some(naive) = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        {
            return Ok(Self(naive.and_utc()));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(|date| Self(date.and_time(NaiveTime::default()).and_utc()))
            .map_err(|_| ParseTimestampError(s.to_string()))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct TimestampVisitor;

        impl Visitor<'_> for TimestampVisitor {
            type Value = Timestamp;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a timestamp string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TimestampVisitor)
    }
}

/// A timerange with a strictly positive length.
///
/// Only constructible through [`TimeInterval::new`], so holding one proves `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeInterval {
    /// Beginning of the interval
    start: Timestamp,

    /// Conclusion of the interval
    end: Timestamp,
}

impl TimeInterval {
    /// Construct a [`TimeInterval`], rejecting empty and time-reversed ranges.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, ValidationError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(ValidationError::Reversed { start, end })
        }
    }

    /// Beginning of the interval
    #[inline]
    pub const fn start(&self) -> Timestamp {
        self.start
    }

    /// Conclusion of the interval
    #[inline]
    pub const fn end(&self) -> Timestamp {
        self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datetime;

    #[test]
    fn test_parse_rfc3339() {
        let ts: Timestamp = "2024-06-01T10:00:00+02:00".parse().unwrap();
        assert_eq!(ts, datetime!(6/1/2024 @ 8:00));
    }

    #[test]
    fn test_parse_datetime_local() {
        let ts: Timestamp = "2024-06-01T10:00".parse().unwrap();
        assert_eq!(ts, datetime!(6/1/2024 @ 10:00));
        let ts: Timestamp = "2024-06-01T10:00:00".parse().unwrap();
        assert_eq!(ts, datetime!(6/1/2024 @ 10:00));
    }

    #[test]
    fn test_parse_bare_date() {
        let ts: Timestamp = "2024-06-01".parse().unwrap();
        assert_eq!(ts, datetime!(6/1/2024));
    }

    #[test]
    fn test_parse_garbage() {
        assert!("next tuesday".parse::<Timestamp>().is_err());
    }

    #[test]
    fn test_serializes_as_rfc3339() {
        let json = serde_json::to_string(&datetime!(6/1/2024 @ 10:00)).unwrap();
        assert_eq!(json, r#""2024-06-01T10:00:00Z""#);
    }

    #[test]
    fn test_fractional_seconds_survive_serialization() {
        let ts: Timestamp = "2024-06-01T10:00:00.2Z".parse().unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, r#""2024-06-01T10:00:00.200Z""#);
        assert_eq!(serde_json::from_str::<Timestamp>(&json).unwrap(), ts);
    }

    #[test]
    fn test_interval_rejects_reversed() {
        assert!(
            TimeInterval::new(datetime!(6/1/2024 @ 14:00), datetime!(6/1/2024 @ 10:00)).is_err(),
            "an interval ending before it starts should be rejected"
        );
    }

    #[test]
    fn test_interval_rejects_empty() {
        assert!(
            TimeInterval::new(datetime!(6/1/2024 @ 10:00), datetime!(6/1/2024 @ 10:00)).is_err(),
            "an interval ending when it starts should be rejected"
        );
    }
}
