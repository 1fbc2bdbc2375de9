//! Error types for telemetry operations.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised by telemetry helpers.
#[derive(Debug)]
pub enum TelemetryError {
    /// Installing the tracing subscriber failed.
    SubscriberInstall {
        /// Underlying tracing subscriber error.
        source: tracing_subscriber::util::TryInitError,
    },
    /// The requested log filter directive could not be parsed.
    InvalidFilter {
        /// Directive supplied by the caller.
        directive: String,
        /// Underlying parse error.
        source: tracing_subscriber::filter::ParseError,
    },
}

impl Display for TelemetryError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubscriberInstall { .. } => {
                formatter.write_str("failed to install tracing subscriber")
            }
            Self::InvalidFilter { directive, .. } => {
                write!(formatter, "invalid log filter '{directive}'")
            }
        }
    }
}

impl Error for TelemetryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SubscriberInstall { source } => Some(source),
            Self::InvalidFilter { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::util::SubscriberInitExt;

    fn try_init_error() -> Result<tracing_subscriber::util::TryInitError> {
        match tracing_subscriber::registry().try_init() {
            Ok(()) => match tracing_subscriber::registry().try_init() {
                Ok(()) => Err(anyhow!("expected init error")),
                Err(err) => Ok(err),
            },
            Err(err) => Ok(err),
        }
    }

    fn parse_error() -> Result<tracing_subscriber::filter::ParseError> {
        match EnvFilter::try_new("idmtool=loud") {
            Ok(_) => Err(anyhow!("expected parse error")),
            Err(err) => Ok(err),
        }
    }

    #[test]
    fn telemetry_error_display_and_source() -> Result<()> {
        let cases = vec![
            (
                TelemetryError::SubscriberInstall {
                    source: try_init_error()?,
                },
                "failed to install tracing subscriber".to_string(),
            ),
            (
                TelemetryError::InvalidFilter {
                    directive: "idmtool=loud".to_string(),
                    source: parse_error()?,
                },
                "invalid log filter 'idmtool=loud'".to_string(),
            ),
        ];

        for (err, message) in cases {
            assert_eq!(err.to_string(), message);
            assert!(err.source().is_some());
        }
        Ok(())
    }
}
