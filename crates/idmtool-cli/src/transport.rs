//! Request model and the single HTTP call each request makes.
//!
//! Transport faults never escape as Rust errors: [`execute`] folds them into
//! [`Outcome::Failure`] with the transport category, and the caller decides
//! how to report them.

use std::error::Error as _;
use std::io;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::client::Credentials;
use crate::response::{Failure, Outcome, interpret};

const APPLICATION_JSON: &str = "application/json";

/// How a request authenticates.
#[derive(Debug, Clone)]
pub(crate) enum Auth {
    Basic(Credentials),
    /// Only the token endpoint is called without credentials.
    Anonymous,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RequestBody {
    Empty,
    Json(Value),
    /// Form-urlencoded pairs, in order.
    Form(Vec<(&'static str, String)>),
}

/// Fully-formed request for one command step. Built fresh and consumed by [`execute`].
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) auth: Auth,
    pub(crate) body: RequestBody,
    pub(crate) headers: HeaderMap,
}

impl ApiRequest {
    pub(crate) fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            auth: Auth::Anonymous,
            body: RequestBody::Empty,
            headers: HeaderMap::new(),
        }
    }

    pub(crate) fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub(crate) fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub(crate) fn put(url: Url) -> Self {
        Self::new(Method::PUT, url)
    }

    /// DELETE with an empty JSON content type, as the AAA service expects.
    pub(crate) fn delete(url: Url) -> Self {
        let mut request = Self::new(Method::DELETE, url);
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        request
    }

    pub(crate) fn basic_auth(mut self, credentials: &Credentials) -> Self {
        self.auth = Auth::Basic(credentials.clone());
        self
    }

    pub(crate) fn json(mut self, payload: Value) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        self.body = RequestBody::Json(payload);
        self
    }

    pub(crate) fn form(mut self, pairs: Vec<(&'static str, String)>) -> Self {
        self.body = RequestBody::Form(pairs);
        self
    }
}

/// Kinds of failure where no HTTP response was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransportFault {
    Connect,
    Tls,
    Timeout,
    Redirect,
    InvalidUrl,
    Encoding,
    Other,
}

impl TransportFault {
    pub(crate) fn classify(err: &reqwest::Error) -> Self {
        if is_tls_failure(err) {
            Self::Tls
        } else if err.is_timeout() {
            Self::Timeout
        } else if err.is_redirect() {
            Self::Redirect
        } else if err.is_builder() {
            Self::InvalidUrl
        } else if err.is_connect() {
            Self::Connect
        } else if err.is_body() || err.is_decode() {
            Self::Encoding
        } else {
            Self::Other
        }
    }

    const fn summary(self) -> &'static str {
        match self {
            Self::Connect => "Connection Failed, Is the Controller running?",
            Self::Tls => "SSL Error, check if HTTPS is configured properly",
            Self::Timeout => "Timeout during Operation",
            Self::Redirect => "Too Many Redirects when fetching the URL",
            Self::InvalidUrl => "URL is invalid",
            Self::Encoding => "Protocol Error in Encoding/Decoding",
            Self::Other => "Request failed",
        }
    }

    const fn hint(self) -> Option<&'static str> {
        match self {
            Self::Tls => {
                Some("To disable certificate verification, use the -k or --insecure flag")
            }
            _ => None,
        }
    }

    pub(crate) fn into_failure(self, err: &reqwest::Error) -> Failure {
        Failure::transport(self.summary(), &error_chain(err), self.hint())
    }
}

/// Whether a rustls error sits anywhere in the cause chain. Connectors wrap
/// handshake failures in `io::Error`, whose `source()` skips the inner error.
fn is_tls_failure(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if cause.downcast_ref::<rustls::Error>().is_some() {
            return true;
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>()
            && io_err
                .get_ref()
                .is_some_and(|inner| inner.is::<rustls::Error>())
        {
            return true;
        }
        source = cause.source();
    }
    false
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// Perform the request once. No retries.
pub(crate) async fn execute(client: &Client, request: ApiRequest) -> Outcome {
    let ApiRequest {
        method,
        url,
        auth,
        body,
        headers,
    } = request;
    debug!(method = %method, url = %url, "sending request");

    let mut builder = client.request(method, url).headers(headers);
    if let Auth::Basic(credentials) = &auth {
        builder = builder.basic_auth(&credentials.username, Some(credentials.password.expose()));
    }
    builder = match &body {
        RequestBody::Empty => builder,
        RequestBody::Json(payload) => builder.json(payload),
        RequestBody::Form(pairs) => builder.form(pairs),
    };

    let response = match builder.send().await {
        Ok(response) => response,
        Err(err) => return TransportFault::classify(&err).into_failure(&err).into(),
    };
    let status = response.status();
    match response.bytes().await {
        Ok(bytes) => {
            debug!(status = status.as_u16(), "received response");
            interpret(status, &bytes)
        }
        Err(err) => TransportFault::classify(&err).into_failure(&err).into(),
    }
}

impl From<Failure> for Outcome {
    fn from(failure: Failure) -> Self {
        Self::Failure(failure)
    }
}
