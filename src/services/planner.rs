//! Fetch window planning.
//!
//! Works out how far back to ask the market-data source for candles so the
//! longest indicator has a full warm-up, without pulling more history than
//! the recommendation service needs to see.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{AppError, Result};

/// Candles requested when no target date is given.
pub const DEFAULT_CANDLE_COUNT: i64 = 50;

/// Target dates newer than this many hours get a shortened window.
pub const RECENT_WINDOW_HOURS: i64 = 50;

const SECONDS_PER_HOUR: i64 = 3600;

/// Where to start fetching, and how many candles that is meant to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FetchWindow {
    pub since: i64,
    pub candle_count: i64,
}

/// Plan the fetch window for a request.
///
/// `target` is the requested replay date in epoch seconds, `now` the current
/// time in epoch seconds.
pub fn plan_window(interval_minutes: u32, target: Option<i64>, now: i64) -> FetchWindow {
    let interval_secs = i64::from(interval_minutes) * 60;

    let Some(target) = target else {
        return FetchWindow {
            since: now - DEFAULT_CANDLE_COUNT * interval_secs,
            candle_count: DEFAULT_CANDLE_COUNT,
        };
    };

    let cutoff = now - RECENT_WINDOW_HOURS * SECONDS_PER_HOUR;

    let candle_count = if target > cutoff {
        let hours_remaining = (target - cutoff).div_euclid(SECONDS_PER_HOUR);
        hours_remaining.clamp(1, DEFAULT_CANDLE_COUNT)
    } else {
        DEFAULT_CANDLE_COUNT
    };

    FetchWindow {
        since: target - candle_count * interval_secs,
        candle_count,
    }
}

/// Offset-carrying forms RFC 3339 does not cover.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Naive forms, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 target date into epoch seconds.
///
/// A trailing `Z` is read as `+00:00`. Accepts date-times with a numeric
/// offset at second or minute precision, naive date-times (taken as UTC),
/// or a bare date (midnight UTC). `T` or a space may separate date and time.
pub fn parse_target_date(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    let normalized = match trimmed.strip_suffix('Z') {
        Some(rest) => format!("{}+00:00", rest),
        None => trimmed.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt.timestamp());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Ok(dt.timestamp());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(naive.and_utc().timestamp());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().timestamp());
        }
    }

    Err(AppError::InvalidDate(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_705_320_000; // 2024-01-15T12:00:00Z
    const HOUR: i64 = 3600;

    #[test]
    fn test_no_target_requests_fifty_candles() {
        for interval in [1, 5, 60, 240, 1440] {
            let window = plan_window(interval, None, NOW);
            assert_eq!(window.candle_count, 50);
            assert_eq!(window.since, NOW - 50 * i64::from(interval) * 60);
        }
    }

    #[test]
    fn test_recent_target_shortens_window() {
        let target = NOW - 10 * HOUR;
        let window = plan_window(60, Some(target), NOW);
        assert_eq!(window.candle_count, 40);
        assert_eq!(window.since, target - 40 * HOUR);
    }

    #[test]
    fn test_target_just_inside_cutoff_clamps_to_one() {
        let target = NOW - 50 * HOUR + 30 * 60;
        let window = plan_window(60, Some(target), NOW);
        assert_eq!(window.candle_count, 1);
        assert_eq!(window.since, target - HOUR);
    }

    #[test]
    fn test_future_target_clamps_to_fifty() {
        let target = NOW + 5 * HOUR;
        let window = plan_window(60, Some(target), NOW);
        assert_eq!(window.candle_count, 50);
    }

    #[test]
    fn test_old_target_uses_full_window() {
        let target = NOW - 30 * 24 * HOUR;
        let window = plan_window(15, Some(target), NOW);
        assert_eq!(window.candle_count, 50);
        assert_eq!(window.since, target - 50 * 15 * 60);
    }

    #[test]
    fn test_target_exactly_at_cutoff_uses_full_window() {
        let target = NOW - 50 * HOUR;
        assert_eq!(plan_window(60, Some(target), NOW).candle_count, 50);
    }

    #[test]
    fn test_parse_with_z_suffix() {
        assert_eq!(parse_target_date("2024-01-15T12:00:00Z").unwrap(), NOW);
        assert_eq!(parse_target_date("2024-01-15T12:00Z").unwrap(), NOW);
        assert_eq!(parse_target_date("2024-01-15T12:00:00.500Z").unwrap(), NOW);
    }

    #[test]
    fn test_parse_with_offset() {
        assert_eq!(parse_target_date("2024-01-15T13:00:00+01:00").unwrap(), NOW);
        assert_eq!(parse_target_date("2024-01-15T12:00+00:00").unwrap(), NOW);
        assert_eq!(parse_target_date("2024-01-15T07:00-05:00").unwrap(), NOW);
        assert_eq!(parse_target_date("2024-01-15 12:00:00+00:00").unwrap(), NOW);
        assert_eq!(parse_target_date("2024-01-15 12:00Z").unwrap(), NOW);
    }

    #[test]
    fn test_parse_naive_is_utc() {
        assert_eq!(parse_target_date("2024-01-15T12:00:00").unwrap(), NOW);
        assert_eq!(parse_target_date("2024-01-15T12:00:00.250").unwrap(), NOW);
        assert_eq!(parse_target_date("2024-01-15T12:00").unwrap(), NOW);
        assert_eq!(parse_target_date("2024-01-15 12:00").unwrap(), NOW);
        assert_eq!(parse_target_date("2024-01-15 12:00:00").unwrap(), NOW);
    }

    #[test]
    fn test_parse_date_only() {
        assert_eq!(parse_target_date("2024-01-15").unwrap(), NOW - 12 * HOUR);
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["yesterday", "", "Z", "2024-13-45T00:00:00Z", "15/01/2024", "2024-01-15T12Z"] {
            let err = parse_target_date(input).unwrap_err();
            assert!(matches!(err, AppError::InvalidDate(_)), "{:?}", input);
        }
    }
}
