//! Jolokia access-password rotation through its OSGi config file.
//!
//! The file is edited locally, independent of the REST API. Only files in
//! `authMode=basic` carry a password that can be rotated.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::properties::entry;

/// Name of the jolokia config file inside the controller's `etc/` directory.
pub const JOLOKIA_CFG_FILENAME: &str = "org.jolokia.osgi.cfg";

const AUTH_MODE_KEY: &str = "authMode";
const PASSWORD_KEY: &str = "password";
const BASIC_MODE: &str = "basic";

/// In-memory copy of the jolokia config, one entry per line with its terminator.
#[derive(Debug, Clone)]
pub struct AuthModeFile {
    path: PathBuf,
    lines: Vec<String>,
}

impl AuthModeFile {
    /// Read the config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            operation: "read",
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_text(path, &text))
    }

    /// Build from already loaded text.
    #[must_use]
    pub fn from_text(path: &Path, text: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            lines: text.split_inclusive('\n').map(str::to_string).collect(),
        }
    }

    /// File this config was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an uncommented `authMode` entry selects basic authentication.
    #[must_use]
    pub fn is_basic_mode(&self) -> bool {
        self.lines.iter().filter_map(|line| entry(line)).any(|(key, value)| {
            matches_key(key, AUTH_MODE_KEY) && value.eq_ignore_ascii_case(BASIC_MODE)
        })
    }

    /// Whether an uncommented password entry exists.
    #[must_use]
    pub fn has_password_entry(&self) -> bool {
        self.lines
            .iter()
            .filter_map(|line| entry(line))
            .any(|(key, _)| matches_key(key, PASSWORD_KEY))
    }

    /// Render the file with every password entry set to `new_password`.
    ///
    /// Keys, separators, line terminators, and all other lines are preserved
    /// byte for byte and in order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PasswordKeyMissing`] when no password entry exists.
    pub fn rewrite_password(&self, new_password: &str) -> ConfigResult<String> {
        let mut replaced = false;
        let mut output = String::with_capacity(self.lines.iter().map(String::len).sum());
        for line in &self.lines {
            match entry(line) {
                Some((key, _)) if matches_key(key, PASSWORD_KEY) => {
                    output.push_str(&replace_value(line, new_password));
                    replaced = true;
                }
                _ => output.push_str(line),
            }
        }
        if replaced {
            Ok(output)
        } else {
            Err(ConfigError::PasswordKeyMissing {
                path: self.path.clone(),
            })
        }
    }

    /// Replace the password on disk.
    ///
    /// The new content is written to a temporary file beside the original and
    /// renamed over it, so readers observe either the old or the new file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AuthModeNotBasic`] or
    /// [`ConfigError::PasswordKeyMissing`] without touching the file, or
    /// [`ConfigError::Io`] when the replacement cannot be written.
    pub fn store_password(&self, new_password: &str) -> ConfigResult<()> {
        if !self.is_basic_mode() {
            return Err(ConfigError::AuthModeNotBasic {
                path: self.path.clone(),
            });
        }
        let text = self.rewrite_password(new_password)?;
        self.replace_file(&text)?;
        info!(path = %self.path.display(), "jolokia password updated");
        Ok(())
    }

    fn replace_file(&self, text: &str) -> ConfigResult<()> {
        let io_error = |operation: &'static str| {
            let path = self.path.clone();
            move |source| ConfigError::Io {
                operation,
                path,
                source,
            }
        };

        let dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut staged = NamedTempFile::new_in(dir).map_err(io_error("stage"))?;
        staged
            .write_all(text.as_bytes())
            .map_err(io_error("write"))?;
        staged.as_file().sync_all().map_err(io_error("sync"))?;
        if let Ok(metadata) = fs::metadata(&self.path) {
            fs::set_permissions(staged.path(), metadata.permissions())
                .map_err(io_error("copy permissions to"))?;
        }
        staged
            .persist(&self.path)
            .map_err(|err| io_error("replace")(err.error))?;
        Ok(())
    }
}

fn matches_key(key: &str, wanted: &str) -> bool {
    key == wanted
        || key
            .strip_suffix(wanted)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn replace_value(line: &str, new_value: &str) -> String {
    let body = line.trim_end_matches(['\r', '\n']);
    let terminator = &line[body.len()..];
    let Some((key_part, value_part)) = body.split_once('=') else {
        return line.to_string();
    };
    let padding = &value_part[..value_part.len() - value_part.trim_start().len()];
    format!("{key_part}={padding}{new_value}{terminator}")
}
