//! CLI error handling

use std::fmt;

use cypack_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(cypack_errors::Error),
    /// Build or provisioning error
    Operation(cypack_errors::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {e}"),
            CliError::Operation(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CliError {}

impl From<cypack_errors::Error> for CliError {
    fn from(err: cypack_errors::Error) -> Self {
        Self::Operation(err)
    }
}
