//! Virtual environment management utilities

use std::path::{Path, PathBuf};

use cypack_errors::{Error, ProvisionError};
use tokio::process::Command;

/// Drives environment creation and dependency installation through the
/// external venv and pip tools.
pub struct VenvManager {
    python: String,
}

impl VenvManager {
    /// Create a manager using the given interpreter
    #[must_use]
    pub fn new(python: String) -> Self {
        Self { python }
    }

    /// Path of the installer executable inside an environment
    #[must_use]
    pub fn installer_path(env_path: &Path) -> PathBuf {
        if cfg!(windows) {
            env_path.join("Scripts").join("pip.exe")
        } else {
            env_path.join("bin").join("pip")
        }
    }

    /// Create the environment with `python -m venv`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool cannot be executed or exits nonzero;
    /// dependency installation cannot proceed without an environment.
    pub async fn create_env(&self, output_root: &Path, env_path: &Path) -> Result<(), Error> {
        let output = Command::new(&self.python)
            .arg("-m")
            .arg("venv")
            .arg(env_path)
            .current_dir(output_root)
            .output()
            .await
            .map_err(|e| ProvisionError::EnvironmentCreationFailed {
                message: format!("failed to execute {}: {e}", self.python),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProvisionError::EnvironmentCreationFailed {
                message: format!("{} -m venv failed: {stderr}", self.python),
            }
            .into());
        }

        Ok(())
    }

    /// Install the manifest with the environment's own pip, cwd set to the
    /// output root so relative references in the manifest resolve there.
    ///
    /// # Errors
    ///
    /// Returns an error if the installer is missing, cannot be executed,
    /// or exits nonzero. The environment is left in place either way.
    pub async fn install_requirements(
        &self,
        output_root: &Path,
        env_path: &Path,
        manifest: &Path,
    ) -> Result<(), Error> {
        let pip = Self::installer_path(env_path);
        if !pip.is_file() {
            return Err(ProvisionError::InstallerMissing {
                path: pip.display().to_string(),
            }
            .into());
        }

        let output = Command::new(&pip)
            .arg("install")
            .arg("-r")
            .arg(manifest)
            .current_dir(output_root)
            .output()
            .await
            .map_err(|e| ProvisionError::DependencyInstallFailed {
                message: format!("failed to execute {}: {e}", pip.display()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProvisionError::DependencyInstallFailed {
                message: format!("pip install failed: {stderr}"),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installer_lives_inside_the_environment() {
        let pip = VenvManager::installer_path(Path::new("/out/venv"));
        if cfg!(windows) {
            assert_eq!(pip, Path::new("/out/venv/Scripts/pip.exe"));
        } else {
            assert_eq!(pip, Path::new("/out/venv/bin/pip"));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_installer_exit_is_an_install_failure() {
        let output = tempfile::tempdir().unwrap();
        let env_path = output.path().join("venv");

        // fake environment whose installer always fails
        let pip = VenvManager::installer_path(&env_path);
        tokio::fs::create_dir_all(pip.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(&pip, b"#!/bin/sh\nexit 3\n").await.unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&pip, std::fs::Permissions::from_mode(0o755))
                .await
                .unwrap();
        }

        let manifest = output.path().join("requirements.txt");
        tokio::fs::write(&manifest, b"requests\n").await.unwrap();

        let err = VenvManager::new("true".to_string())
            .install_requirements(output.path(), &env_path, &manifest)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Provision(cypack_errors::ProvisionError::DependencyInstallFailed { .. })
        ));
    }
}
