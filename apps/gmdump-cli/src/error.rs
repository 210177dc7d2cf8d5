//! CLI error types and exit codes

use gmdump_directory::DirectoryError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General or I/O error
/// - 2: Authentication failed
/// - 3: Network error
/// - 4: Invalid input or configuration
/// - 5: Directory search failed
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Input error: {0}")]
    InputError(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::AuthenticationFailed(_) => 2,
            CliError::ConnectionFailed(_) => 3,
            CliError::Validation(_) | CliError::Config(_) => 4,
            CliError::Directory(_) => 5,
            CliError::Io(_) | CliError::InputError(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::AuthenticationFailed(_) => {
                Some("Check --username and --password, or omit both for an anonymous bind.")
            }
            CliError::ConnectionFailed(_) => {
                Some("Check --host and whether the server expects --secure or --starttls.")
            }
            _ => None,
        }
    }
}

impl From<DirectoryError> for CliError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::AuthenticationFailed => CliError::AuthenticationFailed(e.to_string()),
            DirectoryError::ConnectionFailed { .. } | DirectoryError::ConnectionTimeout { .. } => {
                CliError::ConnectionFailed(e.to_string())
            }
            DirectoryError::InvalidConfiguration { .. } => CliError::Config(e.to_string()),
            DirectoryError::SearchFailed { .. }
            | DirectoryError::NoSuchObject { .. }
            | DirectoryError::CycleDetected { .. }
            | DirectoryError::MaxDepthExceeded { .. } => CliError::Directory(e.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::InputError(format!("Dialog error: {}", e))
    }
}
