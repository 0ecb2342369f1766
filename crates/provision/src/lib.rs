#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Isolated environment provisioning for finished build trees
//!
//! After the build stage completes, this crate checks the output tree for a
//! dependency manifest, creates a virtual environment inside it, and
//! installs the declared dependencies with the environment's own installer.
//! A missing manifest is not an error; the stage reports a no-op outcome.

mod venv;

pub use venv::VenvManager;

use std::path::{Path, PathBuf};

use cypack_config::ProvisionConfig;
use cypack_errors::Error;
use cypack_events::{AppEvent, EventEmitter, EventSender, FailureContext, ProvisionEvent};
use tracing::debug;

/// Conventional dependency manifest filename at the output tree root
pub const MANIFEST_FILE: &str = "requirements.txt";

/// Terminal states of one provisioning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// No manifest present; nothing to do
    SkippedNoManifest,
    /// Environment created and dependencies installed
    Provisioned { env_path: PathBuf },
}

/// Environment provisioner for one output tree
#[derive(Clone)]
pub struct Provisioner {
    /// Interpreter used to create the environment
    python: String,
    config: ProvisionConfig,
    event_sender: Option<EventSender>,
}

impl EventEmitter for Provisioner {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl Provisioner {
    /// Create a provisioner driving the given interpreter
    #[must_use]
    pub fn new(python: impl Into<String>, config: ProvisionConfig) -> Self {
        Self {
            python: python.into(),
            config,
            event_sender: None,
        }
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, event_sender: EventSender) -> Self {
        self.event_sender = Some(event_sender);
        self
    }

    /// Provision the output tree: `NoManifest -> skip`;
    /// `ManifestPresent -> CreatingEnvironment -> InstallingDependencies`.
    ///
    /// Failures here never undo the build: a failed installation leaves the
    /// environment and the compiled output in place, and is reported as one
    /// failure event at this boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if environment creation or dependency installation
    /// fails.
    pub async fn provision(&self, output_root: &Path) -> Result<ProvisionOutcome, Error> {
        self.emit(AppEvent::Provision(ProvisionEvent::Started {
            output_root: output_root.to_path_buf(),
        }));

        match self.run(output_root).await {
            Ok(outcome) => {
                match &outcome {
                    ProvisionOutcome::SkippedNoManifest => {
                        self.emit(AppEvent::Provision(ProvisionEvent::Skipped {
                            manifest: output_root.join(MANIFEST_FILE),
                        }));
                    }
                    ProvisionOutcome::Provisioned { env_path } => {
                        self.emit(AppEvent::Provision(ProvisionEvent::Completed {
                            env_path: env_path.clone(),
                        }));
                    }
                }
                Ok(outcome)
            }
            Err(error) => {
                self.emit(AppEvent::Provision(ProvisionEvent::Failed {
                    failure: FailureContext::from_error(&error),
                }));
                Err(error)
            }
        }
    }

    async fn run(&self, output_root: &Path) -> Result<ProvisionOutcome, Error> {
        let manifest = output_root.join(MANIFEST_FILE);
        if !manifest.is_file() {
            debug!(manifest = %manifest.display(), "no dependency manifest, skipping");
            return Ok(ProvisionOutcome::SkippedNoManifest);
        }

        let manager = VenvManager::new(self.python.clone());
        let env_path = output_root.join(&self.config.env_dir);

        self.emit(AppEvent::Provision(ProvisionEvent::EnvironmentCreating {
            env_path: env_path.clone(),
        }));
        manager.create_env(output_root, &env_path).await?;
        self.emit(AppEvent::Provision(ProvisionEvent::EnvironmentCreated {
            env_path: env_path.clone(),
        }));

        self.emit(AppEvent::Provision(ProvisionEvent::InstallingDependencies {
            manifest: manifest.clone(),
        }));
        manager
            .install_requirements(output_root, &env_path, &manifest)
            .await?;

        Ok(ProvisionOutcome::Provisioned { env_path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cypack_errors::ProvisionError;

    fn provisioner(python: &str) -> Provisioner {
        Provisioner::new(python, ProvisionConfig::default())
    }

    #[tokio::test]
    async fn missing_manifest_is_a_noop() {
        let output = tempfile::tempdir().unwrap();

        let (tx, mut rx) = cypack_events::channel();
        let outcome = provisioner("true")
            .with_event_sender(tx)
            .provision(output.path())
            .await
            .unwrap();

        assert_eq!(outcome, ProvisionOutcome::SkippedNoManifest);
        // no environment directory may appear for a skipped run
        assert!(!output.path().join("venv").exists());

        let mut skipped = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, AppEvent::Provision(ProvisionEvent::Skipped { .. })) {
                skipped = true;
            }
        }
        assert!(skipped);
    }

    #[tokio::test]
    async fn failed_environment_creation_is_terminal() {
        let output = tempfile::tempdir().unwrap();
        tokio::fs::write(output.path().join(MANIFEST_FILE), b"requests\n")
            .await
            .unwrap();

        let err = provisioner("false")
            .provision(output.path())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Provision(ProvisionError::EnvironmentCreationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn missing_installer_is_reported_after_creation() {
        let output = tempfile::tempdir().unwrap();
        tokio::fs::write(output.path().join(MANIFEST_FILE), b"requests\n")
            .await
            .unwrap();

        // `true` exits zero without creating anything, so the freshly
        // "created" environment carries no installer executable.
        let err = provisioner("true")
            .provision(output.path())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Provision(ProvisionError::InstallerMissing { .. })
        ));
    }
}
