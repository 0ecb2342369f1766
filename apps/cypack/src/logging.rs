//! Structured logging integration for events
//!
//! Converts pipeline events into tracing records with structured fields so
//! observability tooling sees the same signals the terminal renderer does.

use cypack_events::{AppEvent, BuildEvent, GeneralEvent, ProvisionEvent};
use tracing::{debug, error, info, warn};

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event(event: &AppEvent) {
    match event {
        AppEvent::Build(build_event) => match build_event {
            BuildEvent::Started {
                source_root,
                output_root,
            } => {
                info!(
                    source_root = %source_root.display(),
                    output_root = %output_root.display(),
                    "Build started"
                );
            }
            BuildEvent::OutputRecreated { output_root } => {
                debug!(output_root = %output_root.display(), "Output tree recreated");
            }
            BuildEvent::FileStaged {
                relative_path,
                class,
            } => {
                debug!(
                    path = %relative_path.display(),
                    class = ?class,
                    "File staged"
                );
            }
            BuildEvent::SubtreePruned { path, reason } => {
                debug!(path = %path.display(), reason = %reason, "Subtree pruned");
            }
            BuildEvent::CompilingExtensions { module_count } => {
                info!(module_count, "Compiling extensions");
            }
            BuildEvent::Completed {
                modules_compiled,
                files_copied,
                duration,
                ..
            } => {
                info!(
                    modules_compiled,
                    files_copied,
                    duration_ms = duration.as_millis() as u64,
                    "Build completed"
                );
            }
            BuildEvent::Failed { failure } => {
                error!(
                    code = ?failure.code,
                    message = %failure.message,
                    "Build failed"
                );
            }
        },

        AppEvent::Provision(provision_event) => match provision_event {
            ProvisionEvent::Started { output_root } => {
                info!(output_root = %output_root.display(), "Provisioning started");
            }
            ProvisionEvent::Skipped { manifest } => {
                info!(manifest = %manifest.display(), "Provisioning skipped: no manifest");
            }
            ProvisionEvent::EnvironmentCreating { env_path } => {
                info!(env_path = %env_path.display(), "Creating environment");
            }
            ProvisionEvent::EnvironmentCreated { env_path } => {
                debug!(env_path = %env_path.display(), "Environment created");
            }
            ProvisionEvent::InstallingDependencies { manifest } => {
                info!(manifest = %manifest.display(), "Installing dependencies");
            }
            ProvisionEvent::Completed { env_path } => {
                info!(env_path = %env_path.display(), "Provisioning completed");
            }
            ProvisionEvent::Failed { failure } => {
                error!(
                    code = ?failure.code,
                    message = %failure.message,
                    "Provisioning failed"
                );
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::Warning { message, context } => {
                warn!(context = ?context, "{message}");
            }
            GeneralEvent::Error { message, details } => {
                error!(details = ?details, "{message}");
            }
            GeneralEvent::DebugLog { message, context } => {
                debug!(context = ?context, "{message}");
            }
            GeneralEvent::OperationStarted { operation } => {
                info!(operation = %operation, "Operation started");
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                info!(operation = %operation, success, "Operation completed");
            }
            GeneralEvent::OperationFailed { operation, failure } => {
                error!(
                    operation = %operation,
                    code = ?failure.code,
                    message = %failure.message,
                    "Operation failed"
                );
            }
        },
    }
}
