//! Smart-meter usage core crate.
//!
//! Normalizes per-account usage downloads (half-hourly consumption, daily
//! meter readings) onto a uniform interval-end time index, merges successive
//! periods into one gapless series, fills the gaps with a seasonal demand
//! model, and regroups the result into bar arrays for rendering. Retrieval
//! from the vendor portal and the actual plotting both live outside this
//! crate.

mod calorific;
mod ingest;
mod model;
mod observability;
mod period;
mod reconcile;
mod regroup;
mod series;

pub use calorific::{parse_calorific_table, read_calorific_table, CalorificError};
pub use ingest::{load_frequency_dir, parse_period_payload, read_period_file, IngestError};
pub use model::{DemandProfile, SeasonalDemandModel, MODEL_EPOCH_MIN};
pub use observability::{init_logging, init_logging_with, LogStyle, LoggingInitError};
pub use period::{
    format_minute_ts, minutes_from_datetime, parse_minute_ts, period_anchor, resolve_period,
    Frequency, PeriodError, PeriodGeometry, HALF_HOURS_PER_DAY, MINUTES_PER_DAY,
    MINUTES_PER_HALF_HOUR,
};
pub use reconcile::{
    cleaned_consumption, cummax, reading_envelope, reconcile, ReadingEnvelope, ReconciledSeries,
    GAS_KWH_TO_M3, GAS_MAX_M3_PER_INTERVAL,
};
pub use regroup::{step_bars, RegroupError};
pub use series::{
    parse_supply, IntervalLabel, MergeError, MeterReadings, Supply, SupplyError, UsageEntry,
    UsageSeries, ALL_SUPPLIES,
};
