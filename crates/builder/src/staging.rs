//! Staging of classified files into the output and scratch trees

use std::path::{Path, PathBuf};

use cypack_errors::{BuildError, Error};
use tokio::fs;

use crate::classify::{FileClass, STAGED_SUFFIX};

/// One compilable module handed to the toolchain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionUnit {
    /// Dot-joined module path, mirroring the import convention
    pub module_name: String,
    /// Staged copy of the source, renamed for the compiler
    pub staged_source: PathBuf,
}

/// Compute the import-style module name for a relative module path.
///
/// `pkg/sub/mod.py` becomes `pkg.sub.mod`.
#[must_use]
pub fn module_name(relative: &Path) -> String {
    relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(".")
}

/// Reconstruct the relative directory structure from a module name.
/// Inverse of [`module_name`] up to the stripped extension.
#[must_use]
pub fn module_relative_path(name: &str) -> PathBuf {
    name.split('.').collect()
}

/// Route one classified file to its destination.
///
/// Assets, markers, and the entry point are copied byte-for-byte into the
/// output tree; modules are copied into the staging tree with the suffix
/// rewritten for the compiler and yield an [`ExtensionUnit`]. The relative
/// path is always computed against the source root by the caller, so nested
/// package structure survives unchanged.
///
/// # Errors
///
/// Any copy failure aborts the build; partial output is acceptable but the
/// failure is never silently skipped.
pub async fn stage_file(
    class: FileClass,
    source_path: &Path,
    relative: &Path,
    output_root: &Path,
    staging_root: &Path,
) -> Result<Option<ExtensionUnit>, Error> {
    match class {
        FileClass::Ignored => Ok(None),
        FileClass::CompilableModule => {
            let staged = staging_root.join(relative).with_extension(STAGED_SUFFIX);
            copy_with_parents(source_path, &staged).await?;
            Ok(Some(ExtensionUnit {
                module_name: module_name(relative),
                staged_source: staged,
            }))
        }
        FileClass::EntryPoint | FileClass::PackageMarker | FileClass::Asset => {
            let target = output_root.join(relative);
            copy_with_parents(source_path, &target).await?;
            Ok(None)
        }
    }
}

async fn copy_with_parents(source: &Path, target: &Path) -> Result<(), Error> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| staging_error(parent, &e))?;
    }
    fs::copy(source, target)
        .await
        .map_err(|e| staging_error(source, &e))?;
    Ok(())
}

fn staging_error(path: &Path, err: &std::io::Error) -> Error {
    BuildError::StagingFailed {
        path: path.display().to_string(),
        message: err.to_string(),
    }
    .into()
}
