//! Build pipeline error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum BuildError {
    #[error("build failed: {message}")]
    Failed { message: String },

    #[error("source root not found or not a directory: {path}")]
    SourceRootInvalid { path: String },

    #[error("entry point not found: {path}")]
    EntryPointInvalid { path: String },

    #[error("traversal failed at {path}: {message}")]
    TraversalFailed { path: String, message: String },

    #[error("staging copy failed for {path}: {message}")]
    StagingFailed { path: String, message: String },

    #[error("output tree preparation failed for {path}: {message}")]
    OutputPrepareFailed { path: String, message: String },

    #[error("toolchain invocation failed: {message}")]
    ToolchainFailed { message: String },

    #[error("toolchain not found: {program}")]
    ToolchainMissing { program: String },

    #[error("a build is already in progress")]
    OperationInProgress,

    #[error("build worker terminated unexpectedly: {message}")]
    WorkerFailed { message: String },
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::SourceRootInvalid { .. } => {
                Some("Point --source at an existing project directory.")
            }
            Self::EntryPointInvalid { .. } => {
                Some("Point --entry at an existing file inside the source tree.")
            }
            Self::ToolchainMissing { .. } => {
                Some("Install Python with Cython and setuptools, or set build.python in the config.")
            }
            Self::ToolchainFailed { .. } => {
                Some("Inspect the compiler output above; the failing module is named there.")
            }
            Self::OperationInProgress => {
                Some("Wait for the running build to finish before starting another.")
            }
            Self::StagingFailed { .. } | Self::OutputPrepareFailed { .. } => {
                Some("Check permissions and free disk space for the output directory.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::OperationInProgress)
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Failed { .. } => "build.failed",
            Self::SourceRootInvalid { .. } => "build.source_root_invalid",
            Self::EntryPointInvalid { .. } => "build.entry_point_invalid",
            Self::TraversalFailed { .. } => "build.traversal_failed",
            Self::StagingFailed { .. } => "build.staging_failed",
            Self::OutputPrepareFailed { .. } => "build.output_prepare_failed",
            Self::ToolchainFailed { .. } => "build.toolchain_failed",
            Self::ToolchainMissing { .. } => "build.toolchain_missing",
            Self::OperationInProgress => "build.operation_in_progress",
            Self::WorkerFailed { .. } => "build.worker_failed",
        };
        Some(code)
    }
}
