//! National Grid calorific value reference table.
//!
//! A small CSV copied from the grid operator's site: one header row, then
//! `DD/MM/YY,value` rows. Values convert gas volume to energy for billing;
//! here they are only loaded as a dated lookup, rounded to one decimal place
//! the way the grid publishes them.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::period::minutes_from_datetime;

#[derive(Debug, Error)]
pub enum CalorificError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("calorific row has {0} fields, expected 2")]
    BadRowShape(usize),
    #[error("malformed calorific date '{0}': expected DD/MM/YY")]
    MalformedDate(String),
    #[error("malformed calorific value '{0}'")]
    MalformedValue(String),
}

/// Reads the table into a map from minute timestamp (midnight of the row's
/// date, year taken as 20xx) to the rounded calorific value.
pub fn read_calorific_table(path: &Path) -> Result<BTreeMap<i64, f64>, CalorificError> {
    parse_calorific_table(File::open(path)?)
}

pub fn parse_calorific_table<R: Read>(reader: R) -> Result<BTreeMap<i64, f64>, CalorificError> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut table = BTreeMap::new();

    for record in csv_reader.records() {
        let record = record?;
        if record.len() != 2 {
            return Err(CalorificError::BadRowShape(record.len()));
        }
        let date_raw = record.get(0).unwrap_or_default();
        let value_raw = record.get(1).unwrap_or_default();

        let date = parse_short_date(date_raw)?;
        let value: f64 = value_raw
            .trim()
            .parse()
            .map_err(|_| CalorificError::MalformedValue(value_raw.to_string()))?;

        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| CalorificError::MalformedDate(date_raw.to_string()))?;
        table.insert(minutes_from_datetime(midnight), (value * 10.0).round() / 10.0);
    }

    Ok(table)
}

fn parse_short_date(raw: &str) -> Result<NaiveDate, CalorificError> {
    let bad = || CalorificError::MalformedDate(raw.to_string());
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(3, '/');
    let day: u32 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let month: u32 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    // The year field must be the grid's two-digit form; anything longer would
    // silently land centuries away once 2000 is added.
    let year_raw = parts.next().ok_or_else(bad)?;
    if year_raw.len() != 2 {
        return Err(bad());
    }
    let year: i32 = year_raw.parse().map_err(|_| bad())?;
    NaiveDate::from_ymd_opt(2000 + year, month, day).ok_or_else(bad)
}
