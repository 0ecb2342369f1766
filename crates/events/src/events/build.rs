use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::FailureContext;

/// How a visited file was classified by the build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileClassKind {
    EntryPoint,
    PackageMarker,
    CompilableModule,
    Asset,
    Ignored,
}

/// Build-specific events for the event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BuildEvent {
    /// Build run started against a source tree
    Started {
        source_root: PathBuf,
        output_root: PathBuf,
    },

    /// Output tree was destroyed and recreated before staging
    OutputRecreated { output_root: PathBuf },

    /// A file was classified and routed to its destination
    FileStaged {
        relative_path: PathBuf,
        class: FileClassKind,
    },

    /// A whole subtree was pruned during traversal
    SubtreePruned { path: PathBuf, reason: String },

    /// Traversal and staging finished; compiler invocation begins
    CompilingExtensions { module_count: usize },

    /// Build run completed
    Completed {
        output_root: PathBuf,
        modules_compiled: usize,
        files_copied: usize,
        duration: Duration,
    },

    /// Build run failed
    Failed { failure: FailureContext },
}
