//! Normalized usage series and the period merge.
//!
//! A `UsageSeries` pairs the complete regular interval-end index of one or
//! more periods with the sparse per-supply observations the vendor actually
//! delivered. Absent entries are the expected common case, never an error;
//! the reconciliation pass fills them from the demand model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Metered supply kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Supply {
    Electricity,
    Gas,
}

pub const ALL_SUPPLIES: [Supply; 2] = [Supply::Electricity, Supply::Gas];

impl Supply {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Electricity => "electricity",
            Self::Gas => "gas",
        }
    }
}

impl std::fmt::Display for Supply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SupplyError {
    #[error("unknown supply: {0}")]
    UnknownSupply(String),
}

pub fn parse_supply(input: &str) -> Result<Supply, SupplyError> {
    match input {
        "electricity" => Ok(Supply::Electricity),
        "gas" => Ok(Supply::Gas),
        other => Err(SupplyError::UnknownSupply(other.to_string())),
    }
}

/// Vendor interval label. Only the start time is carried; the end is derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalLabel {
    pub start: String,
}

/// Opening/closing cumulative meter readings for one daily interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeterReadings {
    pub start: f64,
    pub end: f64,
}

/// One raw vendor observation, passed through as delivered. Half-hourly
/// entries carry `consumption` (kWh); daily entries carry `meterReadings`
/// when the vendor has them, and either field may be absent or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEntry {
    pub interval: IntervalLabel,
    #[serde(default)]
    pub consumption: Option<f64>,
    #[serde(default)]
    pub meter_readings: Option<MeterReadings>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error(
        "periods merged out of order: left series ends at minute {left_end_min}, \
         right series starts at minute {right_start_min}"
    )]
    OutOfOrderMerge { left_end_min: i64, right_start_min: i64 },
    #[error("duplicate {supply} interval at minute {ts_min_utc}")]
    DuplicateInterval { supply: Supply, ts_min_utc: i64 },
}

/// A normalized period, or several periods concatenated in chronological
/// order. `all_times` is always complete and regular even where the supply
/// maps are sparse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSeries {
    pub all_times: Vec<i64>,
    pub electricity: BTreeMap<i64, UsageEntry>,
    pub gas: BTreeMap<i64, UsageEntry>,
}

impl UsageSeries {
    pub fn supply(&self, supply: Supply) -> &BTreeMap<i64, UsageEntry> {
        match supply {
            Supply::Electricity => &self.electricity,
            Supply::Gas => &self.gas,
        }
    }

    pub fn supply_mut(&mut self, supply: Supply) -> &mut BTreeMap<i64, UsageEntry> {
        match supply {
            Supply::Electricity => &mut self.electricity,
            Supply::Gas => &mut self.gas,
        }
    }

    /// Appends a later series, keeping `all_times` a strictly increasing
    /// concatenation. Out-of-order extension and overlapping observation keys
    /// are rejected rather than silently overwritten, since either would
    /// misalign every downstream aggregation.
    pub fn extend_with(&mut self, later: &UsageSeries) -> Result<(), MergeError> {
        if let (Some(&left_end), Some(&right_start)) =
            (self.all_times.last(), later.all_times.first())
        {
            if right_start <= left_end {
                return Err(MergeError::OutOfOrderMerge {
                    left_end_min: left_end,
                    right_start_min: right_start,
                });
            }
        }
        for supply in ALL_SUPPLIES {
            if let Some(&ts_min_utc) = later
                .supply(supply)
                .keys()
                .find(|ts| self.supply(supply).contains_key(*ts))
            {
                return Err(MergeError::DuplicateInterval { supply, ts_min_utc });
            }
        }

        self.all_times.extend_from_slice(&later.all_times);
        for supply in ALL_SUPPLIES {
            let incoming: Vec<(i64, UsageEntry)> = later
                .supply(supply)
                .iter()
                .map(|(ts, entry)| (*ts, entry.clone()))
                .collect();
            self.supply_mut(supply).extend(incoming);
        }
        Ok(())
    }

    /// Non-destructive form of [`extend_with`](Self::extend_with).
    pub fn merged_with(&self, later: &UsageSeries) -> Result<UsageSeries, MergeError> {
        let mut merged = self.clone();
        merged.extend_with(later)?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(start: &str, consumption: f64) -> UsageEntry {
        UsageEntry {
            interval: IntervalLabel {
                start: start.to_string(),
            },
            consumption: Some(consumption),
            meter_readings: None,
        }
    }

    fn series(times: &[i64], gas_points: &[(i64, f64)]) -> UsageSeries {
        let mut s = UsageSeries {
            all_times: times.to_vec(),
            ..UsageSeries::default()
        };
        for (ts, value) in gas_points {
            s.gas.insert(*ts, entry("unused", *value));
        }
        s
    }

    #[test]
    fn merge_concatenates_times_and_unions_observations() {
        let first = series(&[10, 20, 30], &[(10, 1.0), (30, 3.0)]);
        let second = series(&[40, 50], &[(50, 5.0)]);

        let merged = first.merged_with(&second).unwrap();
        assert_eq!(merged.all_times, vec![10, 20, 30, 40, 50]);
        assert!(merged.all_times.windows(2).all(|p| p[0] < p[1]));
        assert_eq!(merged.gas.len(), 3);
        assert_eq!(merged.gas[&50].consumption, Some(5.0));
        assert!(merged.electricity.is_empty());
    }

    #[test]
    fn out_of_order_merge_is_rejected() {
        let first = series(&[40, 50], &[]);
        let second = series(&[10, 20], &[]);

        assert_eq!(
            first.merged_with(&second).unwrap_err(),
            MergeError::OutOfOrderMerge {
                left_end_min: 50,
                right_start_min: 10,
            }
        );
    }

    #[test]
    fn overlapping_observation_keys_are_rejected() {
        // Same observation key even though the time axes do not overlap.
        let mut first = series(&[10, 20], &[(20, 2.0)]);
        first.gas.insert(25, entry("stray", 9.9));
        let second = series(&[30, 40], &[(25, 2.5)]);

        assert_eq!(
            first.merged_with(&second).unwrap_err(),
            MergeError::DuplicateInterval {
                supply: Supply::Gas,
                ts_min_utc: 25,
            }
        );
    }

    #[test]
    fn merging_into_an_empty_series_accepts_anything() {
        let mut acc = UsageSeries::default();
        acc.extend_with(&series(&[10, 20], &[(10, 1.0)])).unwrap();
        assert_eq!(acc.all_times, vec![10, 20]);
    }

    #[test]
    fn supply_names_parse_at_the_boundary() {
        assert_eq!(parse_supply("electricity").unwrap(), Supply::Electricity);
        assert_eq!(parse_supply("gas").unwrap(), Supply::Gas);
        assert_eq!(
            parse_supply("nonsense").unwrap_err(),
            SupplyError::UnknownSupply("nonsense".to_string())
        );
    }
}
