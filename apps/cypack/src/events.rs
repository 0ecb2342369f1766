//! Event handling and progress display

use console::style;
use cypack_events::{AppEvent, BuildEvent, FailureContext, GeneralEvent, ProvisionEvent};

/// Renders pipeline events for the terminal
pub struct EventHandler {
    colors_enabled: bool,
    debug_enabled: bool,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(colors_enabled: bool, debug_enabled: bool) -> Self {
        Self {
            colors_enabled,
            debug_enabled,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: &AppEvent) {
        crate::logging::log_event(event);
        match event {
            AppEvent::Build(event) => self.handle_build_event(event),
            AppEvent::Provision(event) => self.handle_provision_event(event),
            AppEvent::General(event) => self.handle_general_event(event),
        }
    }

    fn handle_build_event(&mut self, event: &BuildEvent) {
        match event {
            BuildEvent::Started {
                source_root,
                output_root,
            } => {
                self.show_status(&format!(
                    "Building {} -> {}",
                    source_root.display(),
                    output_root.display()
                ));
            }
            BuildEvent::OutputRecreated { output_root } => {
                self.show_debug(&format!("output tree recreated: {}", output_root.display()));
            }
            BuildEvent::FileStaged {
                relative_path,
                class,
            } => {
                self.show_debug(&format!("{} [{class:?}]", relative_path.display()));
            }
            BuildEvent::SubtreePruned { path, reason } => {
                self.show_debug(&format!("pruned {} ({reason})", path.display()));
            }
            BuildEvent::CompilingExtensions { module_count } => {
                self.show_status(&format!("Compiling {module_count} extension module(s)"));
            }
            BuildEvent::Completed {
                modules_compiled,
                files_copied,
                duration,
                ..
            } => {
                self.show_success(&format!(
                    "Build finished: {modules_compiled} module(s) compiled, {files_copied} file(s) copied in {duration:.1?}"
                ));
            }
            BuildEvent::Failed { failure } => {
                self.show_failure("Build failed", failure);
            }
        }
    }

    fn handle_provision_event(&mut self, event: &ProvisionEvent) {
        match event {
            ProvisionEvent::Started { output_root } => {
                self.show_status(&format!("Provisioning {}", output_root.display()));
            }
            ProvisionEvent::Skipped { manifest } => {
                self.show_status(&format!(
                    "No dependency manifest at {}; nothing to install",
                    manifest.display()
                ));
            }
            ProvisionEvent::EnvironmentCreating { env_path } => {
                self.show_status(&format!(
                    "Creating isolated environment at {}",
                    env_path.display()
                ));
            }
            ProvisionEvent::EnvironmentCreated { env_path } => {
                self.show_debug(&format!("environment ready: {}", env_path.display()));
            }
            ProvisionEvent::InstallingDependencies { manifest } => {
                self.show_status(&format!("Installing dependencies from {}", manifest.display()));
            }
            ProvisionEvent::Completed { env_path } => {
                self.show_success(&format!(
                    "Dependencies installed into {}",
                    env_path.display()
                ));
            }
            ProvisionEvent::Failed { failure } => {
                self.show_failure("Provisioning failed", failure);
            }
        }
    }

    fn handle_general_event(&mut self, event: &GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => {
                let text = match context {
                    Some(context) => format!("{message}: {context}"),
                    None => message.clone(),
                };
                if self.colors_enabled {
                    eprintln!("{} {text}", style("warning:").yellow().bold());
                } else {
                    eprintln!("warning: {text}");
                }
            }
            GeneralEvent::Error { message, details } => {
                let text = match details {
                    Some(details) => format!("{message}: {details}"),
                    None => message.clone(),
                };
                if self.colors_enabled {
                    eprintln!("{} {text}", style("error:").red().bold());
                } else {
                    eprintln!("error: {text}");
                }
            }
            GeneralEvent::DebugLog { message, .. } => {
                self.show_debug(message);
            }
            GeneralEvent::OperationStarted { operation } => {
                self.show_status(operation);
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                if *success {
                    self.show_success(operation);
                } else {
                    self.show_status(operation);
                }
            }
            GeneralEvent::OperationFailed { operation, failure } => {
                self.show_failure(operation, failure);
            }
        }
    }

    fn show_status(&self, message: &str) {
        println!("{message}");
    }

    fn show_success(&self, message: &str) {
        if self.colors_enabled {
            println!("{} {message}", style("ok:").green().bold());
        } else {
            println!("ok: {message}");
        }
    }

    fn show_debug(&self, message: &str) {
        if self.debug_enabled {
            if self.colors_enabled {
                eprintln!("{} {message}", style("debug:").dim());
            } else {
                eprintln!("debug: {message}");
            }
        }
    }

    fn show_failure(&self, operation: &str, failure: &FailureContext) {
        if self.colors_enabled {
            eprintln!("{} {operation}: {}", style("error:").red().bold(), failure.message);
        } else {
            eprintln!("error: {operation}: {}", failure.message);
        }
        if let Some(hint) = &failure.hint {
            eprintln!("  Hint: {hint}");
        }
    }
}
