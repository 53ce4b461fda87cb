//! Logging setup for the batch binaries.
//!
//! Two environment variables drive everything: `USAGE_LOG_LEVEL` holds an
//! `EnvFilter` directive string (default `info`), and `USAGE_LOG_FORMAT`
//! switches output to line-delimited JSON when set to `json`. Library code
//! only emits `tracing` events; installing a subscriber is the binary's call.

use std::env;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogStyle {
    /// Human-readable single-line output.
    #[default]
    Text,
    /// Line-delimited JSON for log shippers.
    Json,
}

#[derive(Debug, Error)]
pub enum LoggingInitError {
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Installs the global subscriber from the `USAGE_LOG_*` environment.
pub fn init_logging() -> Result<(), LoggingInitError> {
    let level = env::var("USAGE_LOG_LEVEL").ok();
    let style = env::var("USAGE_LOG_FORMAT").ok();
    init_logging_with(
        parse_filter(level.as_deref()),
        style.as_deref().map_or(LogStyle::Text, parse_style),
    )
}

/// Installs the global subscriber with an explicit filter and style.
pub fn init_logging_with(filter: EnvFilter, style: LogStyle) -> Result<(), LoggingInitError> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match style {
        LogStyle::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogStyle::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }
    Ok(())
}

fn parse_style(raw: &str) -> LogStyle {
    if raw.trim().eq_ignore_ascii_case("json") {
        LogStyle::Json
    } else {
        LogStyle::Text
    }
}

/// Blank, unset, or unparseable directives all fall back to `info`; a batch
/// run should never die over a bad logging knob.
fn parse_filter(raw: Option<&str>) -> EnvFilter {
    raw.map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
