//! Target resolution for the REST endpoint.
//!
//! # Design
//! - An explicit `--target-host` override is used verbatim (plus a trailing slash).
//! - Otherwise the pax-web config decides between HTTPS on the secure port and
//!   plain HTTP on the default port.
//! - The resolved [`Target`] is immutable; request URLs are derived from it.

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::properties::load_properties;

/// File consulted to decide whether HTTPS is enabled.
pub const PAX_WEB_CFG_FILENAME: &str = "org.ops4j.pax.web.cfg";

const HTTP_SECURE_ENABLED_KEY: &str = "org.osgi.service.http.secure.enabled";
const HTTP_PORT_SECURE_KEY: &str = "org.osgi.service.http.port.secure";
const DEFAULT_HTTP_PORT: u16 = 8181;
const DEFAULT_HTTP_PORT_SECURE: u16 = 8443;
const DEFAULT_PROTOCOL: &str = "http";
const HTTPS_PROTOCOL: &str = "https";
const DEFAULT_HOST: &str = "localhost";

/// Base URL every request is resolved against. Always ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    base_url: Url,
}

impl Target {
    /// Build a target from its scheme, host, and port.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTarget`] when the parts do not form a valid URL.
    pub fn new(scheme: &str, host: &str, port: u16) -> ConfigResult<Self> {
        Self::from_override(&format!("{scheme}://{host}:{port}/"))
    }

    /// Use a caller-supplied URL as the target, appending a trailing slash if absent.
    ///
    /// The URL is normalized by parsing: the host is lowercased and a port equal
    /// to the scheme default is dropped (`https://Host:443` becomes `https://host/`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTarget`] when the value is not an absolute
    /// `http`/`https` URL.
    pub fn from_override(value: &str) -> ConfigResult<Self> {
        let invalid = |reason: String| ConfigError::InvalidTarget {
            value: value.to_string(),
            reason,
        };

        let mut base_url = Url::parse(value.trim()).map_err(|err| invalid(err.to_string()))?;
        if !matches!(base_url.scheme(), DEFAULT_PROTOCOL | HTTPS_PROTOCOL) {
            return Err(invalid(format!(
                "unsupported scheme '{}' (expected http or https)",
                base_url.scheme()
            )));
        }
        if base_url.cannot_be_a_base() || base_url.host_str().is_none() {
            return Err(invalid("URL must be in form protocol://host:port".to_string()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url })
    }

    /// Base URL including the trailing slash.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL scheme, `http` or `https`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.base_url.scheme()
    }

    /// Host name or address.
    #[must_use]
    pub fn host(&self) -> &str {
        self.base_url.host_str().unwrap_or(DEFAULT_HOST)
    }

    /// Explicit port, or the scheme's well-known port.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.base_url.port_or_known_default()
    }

    /// Append path segments to the base URL, percent-encoding each one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTarget`] if the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> ConfigResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ConfigError::InvalidTarget {
                value: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Resolve the default target from `<etc_dir>/org.ops4j.pax.web.cfg`.
///
/// HTTPS is chosen only when the secure-enabled flag contains `true`; a
/// missing or unreadable file falls back to `http://localhost:8181/`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidTarget`] only if the computed URL is invalid.
pub fn default_target(etc_dir: &Path) -> ConfigResult<Target> {
    let path = etc_dir.join(PAX_WEB_CFG_FILENAME);
    let props = match load_properties(&path) {
        Ok(props) => props,
        Err(err) => {
            debug!(error = %err, "pax web config unavailable; using defaults");
            return Target::new(DEFAULT_PROTOCOL, DEFAULT_HOST, DEFAULT_HTTP_PORT);
        }
    };

    let secure_enabled = props
        .get(HTTP_SECURE_ENABLED_KEY)
        .is_some_and(|value| value.contains("true"));
    if !secure_enabled {
        return Target::new(DEFAULT_PROTOCOL, DEFAULT_HOST, DEFAULT_HTTP_PORT);
    }

    let port = match props.get(HTTP_PORT_SECURE_KEY) {
        Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
            warn!(value = %raw, "ignoring unparseable secure port");
            DEFAULT_HTTP_PORT_SECURE
        }),
        None => DEFAULT_HTTP_PORT_SECURE,
    };
    Target::new(HTTPS_PROTOCOL, DEFAULT_HOST, port)
}

/// Directory holding the controller's config files: `<exe dir>/../etc`.
#[must_use]
pub fn default_etc_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("..").join("etc")))
        .unwrap_or_else(|| PathBuf::from("etc"))
}
