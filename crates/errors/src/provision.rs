//! Environment provisioning error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ProvisionError {
    #[error("environment creation failed: {message}")]
    EnvironmentCreationFailed { message: String },

    #[error("dependency installation failed: {message}")]
    DependencyInstallFailed { message: String },

    #[error("installer not found inside environment: {path}")]
    InstallerMissing { path: String },

    #[error("filesystem operation failed: {operation} on {path}: {message}")]
    FilesystemError {
        operation: String,
        path: String,
        message: String,
    },
}

impl UserFacingError for ProvisionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::EnvironmentCreationFailed { .. } => {
                Some("Ensure the configured Python interpreter ships the venv module.")
            }
            Self::DependencyInstallFailed { .. } => {
                Some("The build output is still usable; fix the requirement and rerun the install stage.")
            }
            Self::InstallerMissing { .. } => {
                Some("Recreate the environment; its installer executable is missing.")
            }
            Self::FilesystemError { .. } => {
                Some("Check permissions and free disk space for the output directory.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::DependencyInstallFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::EnvironmentCreationFailed { .. } => "provision.environment_creation_failed",
            Self::DependencyInstallFailed { .. } => "provision.dependency_install_failed",
            Self::InstallerMissing { .. } => "provision.installer_missing",
            Self::FilesystemError { .. } => "provision.filesystem_error",
        };
        Some(code)
    }
}
