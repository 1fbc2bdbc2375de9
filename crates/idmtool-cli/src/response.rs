//! Uniform interpretation of REST outcomes.
//!
//! # Design
//! - Status codes are partitioned exhaustively: 2xx succeeds, 3xx/4xx/5xx+ map to
//!   their failure category, anything below 200 is reported as unknown.
//! - A success body that is empty, `null`, or not JSON renders nothing; it is
//!   never an error.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::client::{CliError, CliResult};

/// Why a request did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureCategory {
    Redirection,
    ClientError,
    ServerError,
    /// No response was received.
    Transport,
    /// Status outside every known class.
    Unknown,
}

impl FailureCategory {
    /// Category for a status, or `None` when the status is a success.
    pub(crate) const fn for_status(status: StatusCode) -> Option<Self> {
        match status.as_u16() {
            200..=299 => None,
            300..=399 => Some(Self::Redirection),
            400..=499 => Some(Self::ClientError),
            500.. => Some(Self::ServerError),
            _ => Some(Self::Unknown),
        }
    }

    const fn heading(self) -> &'static str {
        match self {
            Self::Redirection => "Redirection Error",
            Self::ClientError => "Client Error",
            Self::ServerError => "Server Error",
            Self::Transport => "Transport Error",
            Self::Unknown => "Unknown Error",
        }
    }
}

/// A failed request: its category, the status when one was received, and the
/// diagnostic shown to the operator.
#[derive(Debug)]
pub(crate) struct Failure {
    category: FailureCategory,
    status: Option<StatusCode>,
    message: String,
}

impl Failure {
    pub(crate) fn from_status(status: StatusCode) -> Self {
        let category = FailureCategory::for_status(status).unwrap_or(FailureCategory::Unknown);
        let code = status.as_u16();
        let message = if category == FailureCategory::Unknown {
            format!("Unknown error; HTTP status code: {code}")
        } else {
            let reason = status.canonical_reason().unwrap_or("Unknown Status");
            let mut lines = vec![
                "Operation Failed".to_string(),
                category.heading().to_string(),
                format!("Reason   :{reason} ({code})"),
            ];
            if let Some(hint) = status_hint(status) {
                lines.push(hint.to_string());
            }
            lines.join("\n")
        };
        Self {
            category,
            status: Some(status),
            message,
        }
    }

    pub(crate) fn transport(summary: &str, detail: &str, hint: Option<&str>) -> Self {
        let mut message = format!("{summary}\n{detail}");
        if let Some(hint) = hint {
            message.push('\n');
            message.push_str(hint);
        }
        Self {
            category: FailureCategory::Transport,
            status: None,
            message,
        }
    }

    pub(crate) const fn category(&self) -> FailureCategory {
        self.category
    }

    pub(crate) const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub(crate) fn report(&self) -> String {
        self.message.clone()
    }
}

fn status_hint(status: StatusCode) -> Option<&'static str> {
    match status {
        StatusCode::UNAUTHORIZED => Some("Incorrect Credentials Provided"),
        StatusCode::NOT_FOUND => {
            Some("RESTconf is either not installed or not initialized yet")
        }
        _ => None,
    }
}

/// Result of one request.
#[derive(Debug)]
pub(crate) enum Outcome {
    /// 2xx; carries the parsed JSON body when there was one.
    Success(Option<Value>),
    Failure(Failure),
}

impl Outcome {
    pub(crate) fn into_result(self) -> CliResult<Option<Value>> {
        match self {
            Self::Success(body) => Ok(body),
            Self::Failure(failure) => Err(CliError::Request(failure)),
        }
    }
}

/// Classify a received response by status and parse its body on success.
pub(crate) fn interpret(status: StatusCode, body: &[u8]) -> Outcome {
    if FailureCategory::for_status(status).is_some() {
        return Outcome::Failure(Failure::from_status(status));
    }
    Outcome::Success(parse_body(body))
}

fn parse_body(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(err) => {
            debug!(error = %err, "response body is not JSON; nothing to render");
            None
        }
    }
}
