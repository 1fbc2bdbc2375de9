//! Logging initialisation primitives.
//!
//! # Design
//! - One entry point installs the global subscriber (fmt or JSON).
//! - Output goes to stderr so command results on stdout stay machine-readable.
//! - `RUST_LOG` overrides the configured level when it is set and valid.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

/// Default log level when neither `RUST_LOG` nor a flag is provided.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level or filter directive (e.g., `warn`, `idmtool_cli=debug`).
    pub level: &'a str,
    /// Output format selection for the tracing subscriber.
    pub format: LogFormat,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::Compact,
        }
    }
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit single-line human-readable logs.
    Compact,
}

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the level directive is invalid or if the tracing
/// subscriber cannot be installed (for example, because another subscriber
/// has already been set globally).
pub fn init_logging(config: &LoggingConfig<'_>) -> Result<()> {
    let filter = build_env_filter(config.level)?;
    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init()
            .map_err(|source| TelemetryError::SubscriberInstall { source }),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .without_time(),
            )
            .try_init()
            .map_err(|source| TelemetryError::SubscriberInstall { source }),
    }
}

fn build_env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|source| TelemetryError::InvalidFilter {
        directive: level.to_string(),
        source,
    })
}
