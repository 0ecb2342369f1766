//! High-level build orchestration

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use cypack_config::BuildConfig;
use cypack_errors::{BuildError, Error};
use cypack_events::{AppEvent, BuildEvent, EventEmitter, FailureContext};
use tempfile::TempDir;
use tokio::fs;
use tracing::debug;

use crate::classify::{classify, FileClass};
use crate::context::BuildContext;
use crate::staging::{stage_file, ExtensionUnit};
use crate::toolchain::compile_extensions;
use crate::walker::{ExclusionRules, SourceWalker};

/// Summary of one completed build run
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Finished output tree
    pub output_root: PathBuf,
    /// Number of modules compiled to extensions
    pub modules_compiled: usize,
    /// Number of files copied verbatim
    pub files_copied: usize,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

/// Staged extension builder
#[derive(Clone)]
pub struct Builder {
    config: BuildConfig,
}

impl Builder {
    /// Create new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: BuildConfig::default(),
        }
    }

    /// Create builder with configuration
    #[must_use]
    pub fn with_config(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Run the classify/walk/stage/compile pipeline once.
    ///
    /// The staging area is a scoped temporary directory, removed on every
    /// exit path. The failure, if any, is reported as a single build event
    /// at this boundary before being returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are invalid, traversal or staging
    /// fails, or the toolchain reports an unsuccessful build.
    pub async fn build(&self, context: BuildContext) -> Result<BuildReport, Error> {
        context.emit(AppEvent::Build(BuildEvent::Started {
            source_root: context.source_root.clone(),
            output_root: context.output_root.clone(),
        }));

        let started = Instant::now();
        match self.run(&context, started).await {
            Ok(report) => {
                context.emit(AppEvent::Build(BuildEvent::Completed {
                    output_root: report.output_root.clone(),
                    modules_compiled: report.modules_compiled,
                    files_copied: report.files_copied,
                    duration: report.duration,
                }));
                Ok(report)
            }
            Err(error) => {
                context.emit(AppEvent::Build(BuildEvent::Failed {
                    failure: FailureContext::from_error(&error),
                }));
                Err(error)
            }
        }
    }

    async fn run(&self, context: &BuildContext, started: Instant) -> Result<BuildReport, Error> {
        let source_root = canonical_source_root(&context.source_root).await?;
        let entry_point = canonical_entry_point(&context.entry_point).await?;

        prepare_output_root(context, &context.output_root).await?;

        // Scratch space for renamed module sources; removed however the
        // run concludes.
        let staging = TempDir::new()?;
        debug!(
            staging_root = %staging.path().display(),
            python = %self.config.python,
            "staging area created"
        );

        let (units, files_copied) = self
            .stage_tree(context, &source_root, &entry_point, staging.path())
            .await?;

        if units.is_empty() {
            context.emit_debug("no compilable modules found; skipping toolchain invocation");
        } else {
            context.emit(AppEvent::Build(BuildEvent::CompilingExtensions {
                module_count: units.len(),
            }));
            compile_extensions(
                &self.config.python,
                &units,
                &context.output_root,
                staging.path(),
            )
            .await?;
        }

        Ok(BuildReport {
            output_root: context.output_root.clone(),
            modules_compiled: units.len(),
            files_copied,
            duration: started.elapsed(),
        })
    }

    async fn stage_tree(
        &self,
        context: &BuildContext,
        source_root: &Path,
        entry_point: &Path,
        staging_root: &Path,
    ) -> Result<(Vec<ExtensionUnit>, usize), Error> {
        // The output root is recreated before the walk; if it lives inside
        // the source tree it must never be walked into.
        let mut rules = ExclusionRules::new(self.config.excluded_dirs.iter().cloned());
        if let Ok(output_canonical) = fs::canonicalize(&context.output_root).await {
            rules = rules.with_pruned_path(output_canonical);
        }
        let mut walker = SourceWalker::new(source_root, rules);
        if let Some(sender) = &context.event_sender {
            walker = walker.with_event_sender(sender.clone());
        }

        let mut units = Vec::new();
        let mut files_copied = 0usize;

        for entry in walker.run() {
            let entry = entry?;
            if entry.file_type().is_some_and(|t| t.is_dir()) {
                continue;
            }
            let path = entry.path();
            let relative = path
                .strip_prefix(source_root)
                .map_err(|_| Error::internal(format!("walked outside source root: {}", path.display())))?
                .to_path_buf();

            let class = classify(path, entry_point);
            let unit = stage_file(class, path, &relative, &context.output_root, staging_root).await?;

            if let Some(unit) = unit {
                units.push(unit);
            } else if class != FileClass::Ignored {
                files_copied += 1;
            }

            context.emit(AppEvent::Build(BuildEvent::FileStaged {
                relative_path: relative,
                class: class.into(),
            }));
        }

        Ok((units, files_copied))
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

async fn canonical_source_root(path: &Path) -> Result<PathBuf, Error> {
    let canonical = fs::canonicalize(path)
        .await
        .map_err(|_| BuildError::SourceRootInvalid {
            path: path.display().to_string(),
        })?;
    if !canonical.is_dir() {
        return Err(BuildError::SourceRootInvalid {
            path: path.display().to_string(),
        }
        .into());
    }
    Ok(canonical)
}

async fn canonical_entry_point(path: &Path) -> Result<PathBuf, Error> {
    fs::canonicalize(path)
        .await
        .map_err(|_| BuildError::EntryPointInvalid {
            path: path.display().to_string(),
        })
        .map_err(Into::into)
}

/// Destroy and recreate the output tree so reruns are idempotent.
async fn prepare_output_root(context: &BuildContext, output_root: &Path) -> Result<(), Error> {
    let prepare = |e: &std::io::Error| BuildError::OutputPrepareFailed {
        path: output_root.display().to_string(),
        message: e.to_string(),
    };

    if output_root.exists() {
        fs::remove_dir_all(output_root)
            .await
            .map_err(|e| prepare(&e))?;
    }
    fs::create_dir_all(output_root)
        .await
        .map_err(|e| prepare(&e))?;

    context.emit(AppEvent::Build(BuildEvent::OutputRecreated {
        output_root: output_root.to_path_buf(),
    }));
    Ok(())
}
