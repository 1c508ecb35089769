//! Human-facing timestamp formats.
//!
//! Used by hosts for range entry fields and axis labels. Parsing never
//! panics: malformed input is reported as [`TimestampParseError::Unparseable`],
//! which callers can tell apart from a valid timestamp that falls outside the
//! project range.

use chrono::{DateTime, NaiveDateTime};

use crate::error::TimestampParseError;
use crate::time::{TimeRange, Timestamp};

/// Nanoseconds in one second.
pub const NANOS_PER_SEC: i64 = 1_000_000_000;

const YMD_HMS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";
const YMD_HMS_PARSE: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Supported timestamp formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimestampFormat {
    /// `yyyy-mm-dd hh:mm:ss.nnnnnnnnn`, in UTC.
    #[default]
    YmdHmsN,
    /// `s.nnnnnnnnn`.
    SecondsPointNanos,
}

impl TimestampFormat {
    /// Format a timestamp for display.
    pub fn format(self, ts: Timestamp) -> String {
        match self {
            Self::YmdHmsN => {
                let secs = ts.div_euclid(NANOS_PER_SEC);
                let nanos = ts.rem_euclid(NANOS_PER_SEC) as u32;
                match DateTime::from_timestamp(secs, nanos) {
                    Some(dt) => dt.format(YMD_HMS_FORMAT).to_string(),
                    None => Self::SecondsPointNanos.format(ts),
                }
            }
            Self::SecondsPointNanos => {
                let sign = if ts < 0 { "-" } else { "" };
                let abs = ts.unsigned_abs();
                let nanos_per_sec = NANOS_PER_SEC as u64;
                format!("{sign}{}.{:09}", abs / nanos_per_sec, abs % nanos_per_sec)
            }
        }
    }

    /// Parse a timestamp in nanoseconds.
    pub fn parse(self, input: &str) -> Result<Timestamp, TimestampParseError> {
        let trimmed = input.trim();
        let parsed = match self {
            Self::YmdHmsN => parse_ymd_hms_n(trimmed),
            Self::SecondsPointNanos => parse_seconds_point_nanos(trimmed),
        };
        parsed.ok_or_else(|| TimestampParseError::Unparseable(input.to_string()))
    }

    /// Parse a timestamp and check it against the project range.
    pub fn parse_in_range(
        self,
        project_range: TimeRange,
        input: &str,
    ) -> Result<Timestamp, TimestampParseError> {
        let timestamp = self.parse(input)?;
        if project_range.contains(timestamp) {
            Ok(timestamp)
        } else {
            Err(TimestampParseError::OutOfRange {
                timestamp,
                range: project_range,
            })
        }
    }
}

fn parse_ymd_hms_n(input: &str) -> Option<Timestamp> {
    // A trailing point with no digits is accepted.
    let input = input.strip_suffix('.').unwrap_or(input);
    let dt = NaiveDateTime::parse_from_str(input, YMD_HMS_PARSE).ok()?;
    let utc = dt.and_utc();
    utc.timestamp()
        .checked_mul(NANOS_PER_SEC)?
        .checked_add(i64::from(utc.timestamp_subsec_nanos()))
}

fn parse_seconds_point_nanos(input: &str) -> Option<Timestamp> {
    let (negative, body) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let mut parts = body.split('.');
    let whole = parts.next()?;
    let fraction = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let value = match fraction {
        // No point: the value is already in nanoseconds.
        None => parse_digits(whole)?,
        Some(fraction) => {
            if whole.is_empty() && fraction.is_empty() {
                return None;
            }
            let secs = if whole.is_empty() { 0 } else { parse_digits(whole)? };
            let nanos = if fraction.is_empty() {
                0
            } else {
                let digits: String = fraction.chars().take(9).collect();
                if !fraction.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                format!("{digits:0<9}").parse::<i64>().ok()?
            };
            secs.checked_mul(NANOS_PER_SEC)?.checked_add(nanos)?
        }
    };

    Some(if negative { -value } else { value })
}

fn parse_digits(input: &str) -> Option<i64> {
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    input.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_point_nanos_formats_padded() {
        let format = TimestampFormat::SecondsPointNanos;
        assert_eq!(format.format(1_500_000_000), "1.500000000");
        assert_eq!(format.format(42), "0.000000042");
    }

    #[test]
    fn seconds_point_nanos_parses_both_units() {
        let format = TimestampFormat::SecondsPointNanos;
        assert_eq!(format.parse("1.5"), Ok(1_500_000_000));
        assert_eq!(format.parse("1500"), Ok(1500));
        assert_eq!(format.parse(".25"), Ok(250_000_000));
        assert_eq!(format.parse("2."), Ok(2_000_000_000));
    }

    #[test]
    fn seconds_point_nanos_rejects_malformed_input() {
        let format = TimestampFormat::SecondsPointNanos;
        for input in ["1.2.3", "abc", "", ".", "1.x", "1e3"] {
            assert_eq!(
                format.parse(input),
                Err(TimestampParseError::Unparseable(input.to_string())),
                "{input}"
            );
        }
    }

    #[test]
    fn ymd_format_roundtrips() {
        let format = TimestampFormat::YmdHmsN;
        let ts = 1_500_000_000_123_456_789;
        let text = format.format(ts);
        assert_eq!(text, "2017-07-14 02:40:00.123456789");
        assert_eq!(format.parse(&text), Ok(ts));
    }

    #[test]
    fn ymd_accepts_short_fractions() {
        let format = TimestampFormat::YmdHmsN;
        assert_eq!(format.parse("1970-01-01 00:00:01.5"), Ok(1_500_000_000));
        assert_eq!(format.parse("1970-01-01 00:00:01."), Ok(1_000_000_000));
        assert_eq!(format.parse("1970-01-01 00:00:01"), Ok(1_000_000_000));
        assert!(format.parse("1970-01-01").is_err());
    }

    #[test]
    fn out_of_range_is_distinct_from_unparseable() {
        let format = TimestampFormat::SecondsPointNanos;
        let range = TimeRange::new(0, 1_000);
        assert_eq!(format.parse_in_range(range, "500"), Ok(500));
        assert_eq!(
            format.parse_in_range(range, "5000"),
            Err(TimestampParseError::OutOfRange {
                timestamp: 5000,
                range,
            })
        );
        assert!(matches!(
            format.parse_in_range(range, "5..0"),
            Err(TimestampParseError::Unparseable(_))
        ));
    }
}
