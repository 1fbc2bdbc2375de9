//! Local rotation of the jolokia access password. No REST calls are made.

use std::path::Path;

use idmtool_config::{AuthModeFile, ConfigError};

use crate::client::CliResult;
use crate::prompt::{PasswordPrompt, poll_new_password};

/// Verify the file can be rotated, prompt for the new password, and replace it.
///
/// Nothing is prompted or written unless the file is in basic auth mode and
/// carries a password entry.
pub(crate) fn handle_change_jolokia_password(
    path: &Path,
    prompt: &dyn PasswordPrompt,
) -> CliResult<()> {
    let config = AuthModeFile::load(path)?;
    if !config.is_basic_mode() {
        return Err(ConfigError::AuthModeNotBasic {
            path: path.to_path_buf(),
        }
        .into());
    }
    if !config.has_password_entry() {
        return Err(ConfigError::PasswordKeyMissing {
            path: path.to_path_buf(),
        }
        .into());
    }

    let new_password = poll_new_password(prompt)?;
    config.store_password(new_password.expose())?;
    println!("Successfully updated the jolokia password!");
    Ok(())
}
