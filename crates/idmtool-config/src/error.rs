//! Error types for local configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File system operation failed.
    #[error("failed to {operation} {}", .path.display())]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// File the operation targeted.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// Target URL override could not be used as a base URL.
    #[error("invalid target host '{value}': {reason}")]
    InvalidTarget {
        /// URL supplied by the caller.
        value: String,
        /// Human-readable reason for the rejection.
        reason: String,
    },
    /// The jolokia configuration is not using basic authentication.
    #[error("idmtool can only modify {} if authMode=basic at this time", .path.display())]
    AuthModeNotBasic {
        /// Configuration file that was inspected.
        path: PathBuf,
    },
    /// No password entry exists in the jolokia configuration.
    #[error("no password entry found in {}", .path.display())]
    PasswordKeyMissing {
        /// Configuration file that was inspected.
        path: PathBuf,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
