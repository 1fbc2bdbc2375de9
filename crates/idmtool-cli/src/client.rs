//! Shared context, credentials, and the CLI error type.

use std::fmt::{self, Debug, Display, Formatter};

use idmtool_config::{ConfigError, Target};
use reqwest::Client;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::prompt::PasswordPrompt;
use crate::response::Failure;

/// The only AAA domain the controller supports.
pub(crate) const DOMAIN: &str = "sdn";
pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const EXIT_FAILURE: i32 = 1;

/// CLI-level error type; every variant is fatal for the invocation.
#[derive(Debug)]
pub(crate) enum CliError {
    /// Non-2xx response or transport fault.
    Request(Failure),
    /// A fetched record could not be used (missing or non-object JSON).
    MalformedRecord(String),
    PasswordMismatch,
    Config(ConfigError),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Request(_)
            | Self::MalformedRecord(_)
            | Self::PasswordMismatch
            | Self::Config(_)
            | Self::Failure(_) => EXIT_FAILURE,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::MalformedRecord(message) => message.clone(),
            Self::Request(failure) => failure.report(),
            Self::PasswordMismatch => {
                "Passwords did not match; cancelling the request".to_string()
            }
            Self::Config(error) => error.to_string(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

/// Password held only in memory and wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub(crate) struct Password(String);

impl Password {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for Password {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("Password(<redacted>)")
    }
}

/// Acting user for basic authentication.
#[derive(Debug, Clone)]
pub(crate) struct Credentials {
    pub(crate) username: String,
    pub(crate) password: Password,
}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) target: Target,
    pub(crate) credentials: Credentials,
    pub(crate) prompt: Box<dyn PasswordPrompt>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::FailureCategory;
    use reqwest::StatusCode;

    #[test]
    fn password_debug_is_redacted() {
        let credentials = Credentials {
            username: "admin".to_string(),
            password: Password::new("hunter2"),
        };
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn every_error_exits_with_one() {
        let errors = [
            CliError::Request(Failure::from_status(StatusCode::UNAUTHORIZED)),
            CliError::MalformedRecord("bad record".to_string()),
            CliError::PasswordMismatch,
            CliError::Config(ConfigError::InvalidTarget {
                value: "x".to_string(),
                reason: "y".to_string(),
            }),
            CliError::failure(anyhow::anyhow!("boom")),
        ];
        for error in errors {
            assert_eq!(error.exit_code(), EXIT_FAILURE);
        }
    }

    #[test]
    fn request_error_message_uses_failure_report() {
        let failure = Failure::from_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failure.category(), FailureCategory::ServerError);
        let message = CliError::Request(failure).display_message();
        assert!(message.starts_with("Operation Failed\nServer Error"));
    }

    #[test]
    fn mismatch_message_is_stable() {
        assert_eq!(
            CliError::PasswordMismatch.display_message(),
            "Passwords did not match; cancelling the request"
        );
    }
}
