//! Reading vendor usage payloads and folding them into one merged series.
//!
//! Files live at `{root}/{frequency}/{period-identifier}.json`. Each payload
//! has one section per supply with a `data` array of observation entries
//! labeled by interval start time. Entries are re-keyed to interval *end*
//! times so they land on the canonical `all_times` index; the vendor's
//! off-by-one interval labeling is undone in the process.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::period::{parse_minute_ts, resolve_period, Frequency, PeriodError, PeriodGeometry};
use crate::series::{parse_supply, MergeError, Supply, SupplyError, UsageEntry, UsageSeries};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed payload JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Period(#[from] PeriodError),
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error(transparent)]
    Supply(#[from] SupplyError),
    #[error("period file {path} has no usable file stem")]
    BadFileName { path: PathBuf },
    #[error("no period files found under {path}")]
    NoPeriodFiles { path: PathBuf },
}

/// Sections may be absent or null when the vendor has no data for a supply,
/// which doubles as its end-of-available-history sentinel. Either way the
/// supply's mapping stays empty here; stopping further requests is the
/// retrieval side's job.
#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    electricity: Option<SupplySection>,
    #[serde(default)]
    gas: Option<SupplySection>,
    #[serde(flatten)]
    other_sections: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SupplySection {
    #[serde(default)]
    data: Vec<UsageEntry>,
}

/// Normalizes one raw payload against its resolved geometry.
///
/// Observation keys are `interval.start + duration`: the vendor labels each
/// interval one duration early (by its start for daily data, and a full
/// interval adrift for half-hourly data), so the shift is what aligns keys
/// with the interval-end convention of `all_times`.
pub fn parse_period_payload(
    raw: &str,
    geometry: &PeriodGeometry,
) -> Result<UsageSeries, IngestError> {
    let payload: RawPayload = serde_json::from_str(raw)?;
    // A top-level section other than the two named supplies means a payload
    // this pipeline does not understand.
    for name in payload.other_sections.keys() {
        parse_supply(name)?;
    }
    let mut series = UsageSeries {
        all_times: geometry.all_times(),
        ..UsageSeries::default()
    };

    let sections = [
        (Supply::Electricity, payload.electricity),
        (Supply::Gas, payload.gas),
    ];
    for (supply, section) in sections {
        let Some(section) = section else {
            debug!(
                component = "ingest",
                event = "ingest.supply.absent",
                supply = supply.as_str()
            );
            continue;
        };
        let map = series.supply_mut(supply);
        for entry in section.data {
            let key = parse_minute_ts(&entry.interval.start)? + geometry.duration_min;
            if map.insert(key, entry).is_some() {
                return Err(MergeError::DuplicateInterval {
                    supply,
                    ts_min_utc: key,
                }
                .into());
            }
        }
    }

    Ok(series)
}

/// Reads and normalizes a single period file; the period identifier is the
/// file stem.
pub fn read_period_file(path: &Path, frequency: Frequency) -> Result<UsageSeries, IngestError> {
    let identifier = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| IngestError::BadFileName {
            path: path.to_path_buf(),
        })?;
    let geometry = resolve_period(identifier, frequency)?;
    let raw = fs::read_to_string(path)?;
    let series = parse_period_payload(&raw, &geometry)?;

    debug!(
        component = "ingest",
        event = "ingest.period.loaded",
        frequency = frequency.as_str(),
        identifier,
        intervals = series.all_times.len(),
        electricity_observed = series.electricity.len(),
        gas_observed = series.gas.len()
    );
    Ok(series)
}

/// Loads every `*.json` period file for one frequency and folds them into a
/// single merged series, oldest first.
///
/// Ordering comes from the calendar anchor parsed out of each file stem, not
/// from filename sort order, so the chronological-disjointness contract of
/// the merge holds regardless of how the directory happens to list.
pub fn load_frequency_dir(root: &Path, frequency: Frequency) -> Result<UsageSeries, IngestError> {
    let dir = root.join(frequency.as_str());
    let mut files: Vec<(NaiveDate, PathBuf)> = Vec::new();
    for dir_entry in fs::read_dir(&dir)? {
        let path = dir_entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let identifier = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| IngestError::BadFileName { path: path.clone() })?;
        let anchor = crate::period::period_anchor(identifier)?;
        files.push((anchor, path));
    }
    if files.is_empty() {
        return Err(IngestError::NoPeriodFiles { path: dir });
    }
    files.sort_by_key(|(anchor, _)| *anchor);

    info!(
        component = "ingest",
        event = "ingest.dir.start",
        frequency = frequency.as_str(),
        path = %dir.display(),
        period_count = files.len()
    );

    let mut merged = UsageSeries::default();
    for (_, path) in &files {
        let period = read_period_file(path, frequency)?;
        merged.extend_with(&period)?;
    }

    info!(
        component = "ingest",
        event = "ingest.dir.finish",
        frequency = frequency.as_str(),
        period_count = files.len(),
        intervals = merged.all_times.len(),
        electricity_observed = merged.electricity.len(),
        gas_observed = merged.gas.len()
    );
    Ok(merged)
}
