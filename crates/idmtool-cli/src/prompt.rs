//! Masked password entry.
//!
//! Passwords are only ever read from the terminal, never from arguments or
//! the environment.

use anyhow::anyhow;

use crate::client::{CliError, CliResult, Password};

pub(crate) const ACTING_PASSWORD_PROMPT: &str = "Password: ";
pub(crate) const NEW_PASSWORD_PROMPT: &str = "Enter new password: ";
pub(crate) const REPEAT_PASSWORD_PROMPT: &str = "Re-enter password: ";

/// Source of passwords typed by the operator.
pub(crate) trait PasswordPrompt {
    fn read_password(&self, prompt: &str) -> CliResult<Password>;
}

/// Reads from the controlling terminal without echo.
pub(crate) struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn read_password(&self, prompt: &str) -> CliResult<Password> {
        rpassword::prompt_password(prompt)
            .map(Password::new)
            .map_err(|err| CliError::failure(anyhow!("failed to read password: {err}")))
    }
}

/// Ask for a new password twice; abort when the entries differ.
pub(crate) fn poll_new_password(prompt: &dyn PasswordPrompt) -> CliResult<Password> {
    let new_password = prompt.read_password(NEW_PASSWORD_PROMPT)?;
    let repeated = prompt.read_password(REPEAT_PASSWORD_PROMPT)?;
    if new_password != repeated {
        return Err(CliError::PasswordMismatch);
    }
    Ok(new_password)
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedPrompt;
    use super::*;

    #[test]
    fn matching_entries_return_password() -> CliResult<()> {
        let prompt = ScriptedPrompt::new(["s3cret", "s3cret"]);
        let password = poll_new_password(&prompt)?;
        assert_eq!(password.expose(), "s3cret");
        assert_eq!(
            prompt.asked(),
            vec![NEW_PASSWORD_PROMPT.to_string(), REPEAT_PASSWORD_PROMPT.to_string()]
        );
        Ok(())
    }

    #[test]
    fn mismatched_entries_abort() {
        let prompt = ScriptedPrompt::new(["pw1", "pw2"]);
        assert!(matches!(
            poll_new_password(&prompt),
            Err(CliError::PasswordMismatch)
        ));
    }
}
