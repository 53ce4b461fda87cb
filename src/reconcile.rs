//! Gap filling and reconciliation against the demand model.
//!
//! Every timestamp of a merged series gets an estimate: the cleaned observed
//! value where the vendor delivered one, the model's expected usage where it
//! did not. Gas consumption arrives in kWh and is converted to volumetric
//! units first; values beyond a physically plausible flow are treated as
//! unobserved, because the vendor flags bad data with a huge numeric sentinel
//! instead of omitting the entry.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::SeasonalDemandModel;
use crate::period::Frequency;
use crate::series::{Supply, UsageEntry, UsageSeries};

/// kWh to m^3 for gas: 3.6 MJ/kWh over calorific value times volume correction.
pub const GAS_KWH_TO_M3: f64 = 3.6 / (39.5 * 1.02264);

/// A U6 domestic meter tops out around 6 m^3/hour, so no honest interval can
/// reach this; the vendor's (2^24 - 1)/1000 kWh bad-data sentinel always does.
pub const GAS_MAX_M3_PER_INTERVAL: f64 = 50.0;

/// Per-timestamp reconciliation of one supply, aligned to `all_times`.
/// `estimate` is in metered units per day; `residual` is model minus observed
/// where observed and zero elsewhere; `cumulative_reading` approximates a
/// meter-reading curve by accumulating the estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledSeries {
    pub supply: Supply,
    pub times: Vec<i64>,
    pub estimate: Vec<f64>,
    pub observed: Vec<bool>,
    pub residual: Vec<f64>,
    pub cumulative_reading: Vec<f64>,
}

impl ReconciledSeries {
    pub fn observed_count(&self) -> usize {
        self.observed.iter().filter(|flag| **flag).count()
    }

    pub fn residual_sum_of_squares(&self) -> f64 {
        self.residual.iter().map(|r| r * r).sum()
    }
}

/// Cleaned per-interval observation in metered units, or `None` where the
/// entry is absent, empty, or fails the gas plausibility ceiling.
pub fn cleaned_consumption(supply: Supply, entry: &UsageEntry) -> Option<f64> {
    let kwh = entry.consumption?;
    match supply {
        Supply::Electricity => Some(kwh),
        Supply::Gas => {
            let m3 = kwh * GAS_KWH_TO_M3;
            if m3 > GAS_MAX_M3_PER_INTERVAL {
                warn!(
                    component = "reconcile",
                    event = "reconcile.gas.implausible",
                    interval_start = %entry.interval.start,
                    kwh,
                    m3,
                    "discarding implausible gas reading"
                );
                None
            } else {
                Some(m3)
            }
        }
    }
}

/// Combines a merged series with the model into a gap-free estimate series.
pub fn reconcile(
    series: &UsageSeries,
    supply: Supply,
    frequency: Frequency,
    model: &SeasonalDemandModel,
) -> ReconciledSeries {
    let per_day = f64::from(frequency.intervals_per_day());
    let observations = series.supply(supply);

    let mut estimate = Vec::with_capacity(series.all_times.len());
    let mut observed = Vec::with_capacity(series.all_times.len());
    let mut residual = Vec::with_capacity(series.all_times.len());
    let mut cumulative_reading = Vec::with_capacity(series.all_times.len());
    let mut running = 0.0;

    for &ts in &series.all_times {
        let expected = model.expected_daily_usage(supply, ts);
        let cleaned = observations
            .get(&ts)
            .and_then(|entry| cleaned_consumption(supply, entry));
        let value = match cleaned {
            Some(units) => {
                let rate = units * per_day;
                observed.push(true);
                residual.push(expected - rate);
                rate
            }
            None => {
                observed.push(false);
                residual.push(0.0);
                expected
            }
        };
        estimate.push(value);
        running += value / per_day;
        cumulative_reading.push(running);
    }

    ReconciledSeries {
        supply,
        times: series.all_times.clone(),
        estimate,
        observed,
        residual,
        cumulative_reading,
    }
}

/// Lo/hi meter-reading series for a daily merged series, with the legacy
/// zero pre-fill where readings are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingEnvelope {
    pub supply: Supply,
    pub times: Vec<i64>,
    pub lo: Vec<f64>,
    pub hi: Vec<f64>,
}

/// Extracts the per-day opening/closing meter readings and smooths both edges
/// with a cumulative maximum, so gaps keyed at zero never pull the rendered
/// envelope back below readings already seen.
pub fn reading_envelope(series: &UsageSeries, supply: Supply) -> ReadingEnvelope {
    let observations = series.supply(supply);
    let raw_lo: Vec<f64> = series
        .all_times
        .iter()
        .map(|ts| {
            observations
                .get(ts)
                .and_then(|entry| entry.meter_readings)
                .map_or(0.0, |readings| readings.start)
        })
        .collect();
    let raw_hi: Vec<f64> = series
        .all_times
        .iter()
        .map(|ts| {
            observations
                .get(ts)
                .and_then(|entry| entry.meter_readings)
                .map_or(0.0, |readings| readings.end)
        })
        .collect();

    ReadingEnvelope {
        supply,
        times: series.all_times.clone(),
        lo: cummax(&raw_lo),
        hi: cummax(&raw_hi),
    }
}

/// Running maximum of a value series.
pub fn cummax(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut best = f64::NEG_INFINITY;
    for &value in values {
        best = best.max(value);
        out.push(best);
    }
    out
}
