use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Environment provisioning events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProvisionEvent {
    /// Provisioning started against a finished output tree
    Started { output_root: PathBuf },

    /// No dependency manifest present; provisioning is a no-op
    Skipped { manifest: PathBuf },

    /// Isolated environment creation started
    EnvironmentCreating { env_path: PathBuf },

    /// Isolated environment is ready
    EnvironmentCreated { env_path: PathBuf },

    /// Dependency installation started
    InstallingDependencies { manifest: PathBuf },

    /// Provisioning finished successfully
    Completed { env_path: PathBuf },

    /// Provisioning failed
    Failed { failure: FailureContext },
}
