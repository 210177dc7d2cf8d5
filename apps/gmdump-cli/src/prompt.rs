//! Interactive password prompt.

use std::io::IsTerminal;

use dialoguer::Password;

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

/// Bind password for `cli`.
///
/// Prompts with hidden input when a username was given without a password.
pub fn resolve_password(cli: &Cli) -> CliResult<Option<String>> {
    match (&cli.username, &cli.password) {
        (Some(_), Some(password)) => Ok(Some(password.clone())),
        (Some(username), None) => prompt_password(username).map(Some),
        (None, _) => Ok(None),
    }
}

fn prompt_password(username: &str) -> CliResult<String> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation(format!(
            "No password given for '{}' and stdin is not a terminal.\n\
             Pass --password or set GMDUMP_PASSWORD.",
            username
        )));
    }

    let password = Password::new()
        .with_prompt(format!("Password for {}", username))
        .interact()?;

    Ok(password)
}
