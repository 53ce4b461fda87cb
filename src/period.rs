//! Period identifiers and interval geometry.
//!
//! Vendor datasets come in two sampling cadences, and each downloaded file
//! covers one period: a calendar month for daily data (`2019-12.json`) or a
//! single day for half-hourly data (`2019-12-17.json`). Every observation is
//! indexed by the time its measurement interval *ends*, and all timestamps are
//! whole minutes since the Unix epoch (UTC).

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MINUTES_PER_HALF_HOUR: i64 = 30;
pub const MINUTES_PER_DAY: i64 = 24 * 60;
pub const HALF_HOURS_PER_DAY: u32 = 48;

/// Sampling cadence of a vendor dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    HalfHourly,
}

impl Frequency {
    /// Directory name used by the vendor download layout.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::HalfHourly => "half-hourly",
        }
    }

    /// Length of one measurement interval in minutes.
    pub fn duration_min(self) -> i64 {
        match self {
            Self::Daily => MINUTES_PER_DAY,
            Self::HalfHourly => MINUTES_PER_HALF_HOUR,
        }
    }

    /// Number of intervals that make up one calendar day.
    pub fn intervals_per_day(self) -> u32 {
        match self {
            Self::Daily => 1,
            Self::HalfHourly => HALF_HOURS_PER_DAY,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    #[error("bad period identifier '{0}': expected YYYY-MM or YYYY-MM-DD")]
    BadPeriodIdentifier(String),
    #[error("period identifier '{identifier}' does not name a {frequency} period")]
    FrequencyMismatch {
        identifier: String,
        frequency: Frequency,
    },
    #[error("malformed timestamp '{0}': expected minute resolution YYYY-MM-DDTHH:MM")]
    MalformedTimestamp(String),
}

/// Resolved geometry of one period: a strictly increasing arithmetic sequence
/// of interval-end timestamps with fixed spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodGeometry {
    pub frequency: Frequency,
    pub duration_min: i64,
    pub interval_count: u32,
    pub first_interval_end_min: i64,
}

impl PeriodGeometry {
    /// End time of the last interval in the period.
    pub fn last_interval_end_min(&self) -> i64 {
        self.first_interval_end_min + i64::from(self.interval_count - 1) * self.duration_min
    }

    /// The complete regular sequence of interval-end timestamps.
    pub fn all_times(&self) -> Vec<i64> {
        (0..i64::from(self.interval_count))
            .map(|i| self.first_interval_end_min + i * self.duration_min)
            .collect()
    }
}

impl std::fmt::Display for PeriodGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} x {} intervals of {}min from {}",
            self.frequency,
            self.interval_count,
            self.duration_min,
            format_minute_ts(self.first_interval_end_min)
        )
    }
}

/// Resolves a period identifier into its interval geometry.
///
/// Identifier shape is decided by length: 7 characters (`YYYY-MM`) names a
/// daily period covering the whole month, 10 characters (`YYYY-MM-DD`) names a
/// half-hourly period covering one day. The vendor labels intervals by start
/// time, so the first interval *end* sits one duration after the period label.
pub fn resolve_period(identifier: &str, frequency: Frequency) -> Result<PeriodGeometry, PeriodError> {
    let anchor = period_anchor(identifier)?;
    let derived = match identifier.len() {
        7 => Frequency::Daily,
        10 => Frequency::HalfHourly,
        _ => unreachable!("period_anchor only accepts 7 or 10 character identifiers"),
    };
    if derived != frequency {
        return Err(PeriodError::FrequencyMismatch {
            identifier: identifier.to_string(),
            frequency,
        });
    }

    let interval_count = match frequency {
        Frequency::Daily => days_in_month(anchor.year(), anchor.month()),
        Frequency::HalfHourly => HALF_HOURS_PER_DAY,
    };
    let label_min = minutes_from_datetime(
        anchor
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| PeriodError::BadPeriodIdentifier(identifier.to_string()))?,
    );

    Ok(PeriodGeometry {
        frequency,
        duration_min: frequency.duration_min(),
        interval_count,
        first_interval_end_min: label_min + frequency.duration_min(),
    })
}

/// Calendar anchor of a period identifier: the first day of the named month
/// for daily periods, the named day itself for half-hourly periods. Used to
/// order period files chronologically without relying on filename sort order.
pub fn period_anchor(identifier: &str) -> Result<NaiveDate, PeriodError> {
    let bad = || PeriodError::BadPeriodIdentifier(identifier.to_string());
    match identifier.len() {
        7 => {
            let (year, month) = identifier.split_once('-').ok_or_else(bad)?;
            let year: i32 = year.parse().map_err(|_| bad())?;
            let month: u32 = month.parse().map_err(|_| bad())?;
            NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(bad)
        }
        10 => NaiveDate::parse_from_str(identifier, "%Y-%m-%d").map_err(|_| bad()),
        _ => Err(bad()),
    }
}

/// Parses a vendor timestamp to whole minutes since the epoch. Anything past
/// minute resolution (seconds, fraction, zone suffix) is ignored.
pub fn parse_minute_ts(raw: &str) -> Result<i64, PeriodError> {
    let head = raw
        .get(..16)
        .ok_or_else(|| PeriodError::MalformedTimestamp(raw.to_string()))?;
    let dt = NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M")
        .map_err(|_| PeriodError::MalformedTimestamp(raw.to_string()))?;
    Ok(minutes_from_datetime(dt))
}

/// Renders a minute timestamp back to `YYYY-MM-DDTHH:MM` for logs and reports.
pub fn format_minute_ts(ts_min_utc: i64) -> String {
    match DateTime::from_timestamp(ts_min_utc * 60, 0) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M").to_string(),
        None => format!("<out-of-range minute {ts_min_utc}>"),
    }
}

pub fn minutes_from_datetime(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp() / 60
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("validated month start");
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).expect("valid next year start")
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).expect("valid next month start")
    };
    (next - first).num_days() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_hourly_period_is_48_half_hours_over_one_day() {
        let geom = resolve_period("2019-12-17", Frequency::HalfHourly).unwrap();
        assert_eq!(geom.duration_min, 30);
        assert_eq!(geom.interval_count, 48);

        let times = geom.all_times();
        assert_eq!(times.len(), 48);
        // First interval ends half an hour into the labeled day.
        assert_eq!(times[0], parse_minute_ts("2019-12-17T00:30").unwrap());
        // Last interval ends at midnight of the next day.
        assert_eq!(times[47], parse_minute_ts("2019-12-18T00:00").unwrap());
        assert_eq!(geom.last_interval_end_min(), times[47]);
    }

    #[test]
    fn daily_period_length_follows_the_civil_calendar() {
        let cases = [("2020-02", 29), ("2021-02", 28), ("2021-04", 30), ("2019-12", 31)];
        for (identifier, expected_days) in cases {
            let geom = resolve_period(identifier, Frequency::Daily).unwrap();
            assert_eq!(geom.interval_count, expected_days, "{identifier}");
            assert_eq!(geom.duration_min, MINUTES_PER_DAY);
        }
    }

    #[test]
    fn daily_first_interval_ends_at_the_end_of_day_one() {
        let geom = resolve_period("2019-12", Frequency::Daily).unwrap();
        assert_eq!(
            geom.first_interval_end_min,
            parse_minute_ts("2019-12-02T00:00").unwrap()
        );
        assert_eq!(
            geom.last_interval_end_min(),
            parse_minute_ts("2020-01-01T00:00").unwrap()
        );
    }

    #[test]
    fn all_times_is_strictly_increasing_and_evenly_spaced() {
        for (identifier, frequency) in
            [("2020-02", Frequency::Daily), ("2020-02-29", Frequency::HalfHourly)]
        {
            let geom = resolve_period(identifier, frequency).unwrap();
            let times = geom.all_times();
            for pair in times.windows(2) {
                assert_eq!(pair[1] - pair[0], geom.duration_min);
            }
        }
    }

    #[test]
    fn unrecognized_identifier_lengths_are_rejected() {
        for identifier in ["2019", "2019-12-17T00", "19-12", ""] {
            assert_eq!(
                period_anchor(identifier).unwrap_err(),
                PeriodError::BadPeriodIdentifier(identifier.to_string())
            );
        }
        // Right length, nonsense content.
        assert!(matches!(
            resolve_period("2019-13", Frequency::Daily),
            Err(PeriodError::BadPeriodIdentifier(_))
        ));
        assert!(matches!(
            resolve_period("xxxx-yy", Frequency::Daily),
            Err(PeriodError::BadPeriodIdentifier(_))
        ));
    }

    #[test]
    fn identifier_and_frequency_tag_must_agree() {
        assert!(matches!(
            resolve_period("2019-12", Frequency::HalfHourly),
            Err(PeriodError::FrequencyMismatch { .. })
        ));
        assert!(matches!(
            resolve_period("2019-12-17", Frequency::Daily),
            Err(PeriodError::FrequencyMismatch { .. })
        ));
    }

    #[test]
    fn minute_timestamps_round_trip_and_ignore_sub_minute_detail() {
        let from_vendor = parse_minute_ts("2021-03-14T15:30:00.000Z").unwrap();
        let plain = parse_minute_ts("2021-03-14T15:30").unwrap();
        assert_eq!(from_vendor, plain);
        assert_eq!(format_minute_ts(plain), "2021-03-14T15:30");

        assert_eq!(
            parse_minute_ts("half past three").unwrap_err(),
            PeriodError::MalformedTimestamp("half past three".to_string())
        );
        assert!(matches!(
            parse_minute_ts("2021-03-14"),
            Err(PeriodError::MalformedTimestamp(_))
        ));
    }
}
