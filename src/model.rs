//! Seasonal demand model.
//!
//! A fixed cosine curve over the day of year, peaking in mid January, gives
//! an expected consumption in metered units per day wherever smart data is
//! missing. The calibration constants are deliberately crude; what matters
//! downstream is that a deterministic estimate exists at every timestamp.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::period::MINUTES_PER_DAY;
use crate::series::Supply;

/// 2020-01-01T00:00:00Z in whole minutes since the Unix epoch.
pub const MODEL_EPOCH_MIN: i64 = 26_297_280;

const YEAR_ANGULAR_FREQ: f64 = 2.0 * PI / 365.0;

/// Calibration constants for one supply kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandProfile {
    /// Day of year around which demand peaks.
    pub peak_day: f64,
    /// Dimensionless calibration coefficient.
    pub scale: f64,
    /// Typical minimum demand, metered units per day.
    pub baseline: f64,
    /// Average of the seasonal part of demand, metered units per day.
    pub amplitude_mean: f64,
    /// Typical seasonal swing around that average, metered units per day.
    pub amplitude_swing: f64,
}

/// Immutable per-supply model parameters, constructed once and passed
/// explicitly to every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalDemandModel {
    pub electricity: DemandProfile,
    pub gas: DemandProfile,
}

impl Default for SeasonalDemandModel {
    fn default() -> Self {
        Self {
            electricity: DemandProfile {
                peak_day: 15.0,
                scale: 1.0,
                baseline: 9.5,
                amplitude_mean: 0.0,
                amplitude_swing: 0.0,
            },
            gas: DemandProfile {
                peak_day: 15.0,
                scale: 1.0,
                baseline: 0.85,
                amplitude_mean: 6.35,
                amplitude_swing: 8.8,
            },
        }
    }
}

impl SeasonalDemandModel {
    pub fn profile(&self, supply: Supply) -> &DemandProfile {
        match supply {
            Supply::Electricity => &self.electricity,
            Supply::Gas => &self.gas,
        }
    }

    /// Expected consumption in metered units per day at the given minute.
    ///
    /// Days elapsed since the model epoch may be fractional or negative; the
    /// seasonal term is clipped at zero before scaling, so the result never
    /// drops below `scale * baseline`.
    pub fn expected_daily_usage(&self, supply: Supply, ts_min_utc: i64) -> f64 {
        let profile = self.profile(supply);
        let days = (ts_min_utc - MODEL_EPOCH_MIN) as f64 / MINUTES_PER_DAY as f64;
        let seasonal = profile.amplitude_mean
            + profile.amplitude_swing * (YEAR_ANGULAR_FREQ * (days - profile.peak_day)).cos();
        profile.scale * (profile.baseline + seasonal.max(0.0))
    }
}
