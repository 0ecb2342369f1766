//! Path classification for the build pipeline

use std::path::Path;

use cypack_events::FileClassKind;

/// Suffix of compilable module sources
pub const MODULE_SUFFIX: &str = "py";

/// Suffix staged sources are rewritten to for the Cython toolchain
pub const STAGED_SUFFIX: &str = "pyx";

/// Filename that marks a directory as an importable package
pub const PACKAGE_MARKER: &str = "__init__.py";

/// Byte-compiled cache suffixes that never reach the output tree
pub const CACHE_SUFFIXES: [&str; 2] = ["pyc", "pyo"];

/// Role of a single file within the build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// The designated program entry point, copied verbatim even if it is
    /// a module source
    EntryPoint,
    /// Package marker, copied verbatim
    PackageMarker,
    /// Module source slated for extension compilation
    CompilableModule,
    /// Any other file, copied verbatim
    Asset,
    /// Byte-compiled cache artifact, skipped entirely
    Ignored,
}

impl From<FileClass> for FileClassKind {
    fn from(class: FileClass) -> Self {
        match class {
            FileClass::EntryPoint => FileClassKind::EntryPoint,
            FileClass::PackageMarker => FileClassKind::PackageMarker,
            FileClass::CompilableModule => FileClassKind::CompilableModule,
            FileClass::Asset => FileClassKind::Asset,
            FileClass::Ignored => FileClassKind::Ignored,
        }
    }
}

/// Classify a single file.
///
/// `path` must be absolute and rooted under the canonicalized source root;
/// `entry_point` must be the canonicalized entry point path. The function is
/// pure: rules depend only on the two paths, and every path maps to exactly
/// one class. Priority order: cache suffix, entry-point identity, package
/// marker, module suffix, asset.
#[must_use]
pub fn classify(path: &Path, entry_point: &Path) -> FileClass {
    let suffix = path.extension().and_then(|e| e.to_str());

    if suffix.is_some_and(|e| CACHE_SUFFIXES.contains(&e)) {
        return FileClass::Ignored;
    }

    if path == entry_point {
        return FileClass::EntryPoint;
    }

    let file_name = path.file_name().and_then(|n| n.to_str());
    if file_name == Some(PACKAGE_MARKER) {
        return FileClass::PackageMarker;
    }

    if suffix == Some(MODULE_SUFFIX) {
        return FileClass::CompilableModule;
    }

    FileClass::Asset
}
