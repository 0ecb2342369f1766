//! Source tree traversal with subtree pruning

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cypack_errors::{BuildError, Error};
use cypack_events::{AppEvent, BuildEvent, EventEmitter, EventSender};
use ignore::WalkBuilder;

/// Pluggable predicate deciding whether a directory looks like an isolated
/// environment. Platform-specific marker sets can be swapped without
/// touching traversal logic.
pub type EnvProbe = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Probe a directory for virtual environment markers.
///
/// A name match alone is not trusted: environments may be user-named
/// arbitrarily, so the directory is probed for `pyvenv.cfg` or for the
/// platform activation script.
#[must_use]
pub fn is_virtualenv_dir(path: &Path) -> bool {
    path.join("pyvenv.cfg").is_file()
        || path.join("bin").join("activate").is_file()
        || path.join("Scripts").join("activate").is_file()
}

/// Exclusion rules applied while walking the source tree
#[derive(Clone)]
pub struct ExclusionRules {
    names: HashSet<String>,
    pruned_paths: Vec<PathBuf>,
    env_probe: EnvProbe,
}

impl ExclusionRules {
    /// Create rules pruning the given directory names plus any directory
    /// the default probe flags as a virtual environment.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            pruned_paths: Vec::new(),
            env_probe: Arc::new(is_virtualenv_dir),
        }
    }

    /// Prune one exact directory path. Used to keep an output tree nested
    /// inside the source root from being walked into.
    #[must_use]
    pub fn with_pruned_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pruned_paths.push(path.into());
        self
    }

    /// Replace the environment-detection predicate.
    #[must_use]
    pub fn with_env_probe(mut self, probe: EnvProbe) -> Self {
        self.env_probe = probe;
        self
    }

    /// Reason a directory is pruned, if any.
    #[must_use]
    pub fn prune_reason(&self, path: &Path) -> Option<&'static str> {
        let name = path.file_name().and_then(|n| n.to_str());
        if name.is_some_and(|n| self.names.contains(n)) {
            return Some("excluded directory name");
        }
        if self.pruned_paths.iter().any(|p| p == path) {
            return Some("reserved path");
        }
        if (self.env_probe)(path) {
            return Some("virtual environment");
        }
        None
    }
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self::new(["__pycache__"])
    }
}

/// Lazy, restartable-by-reconstruction traversal of a source root.
///
/// Pruning happens before descent: an excluded directory is never entered,
/// so its contents can never reach the staging planner.
pub struct SourceWalker {
    root: PathBuf,
    rules: ExclusionRules,
    event_sender: Option<EventSender>,
}

impl SourceWalker {
    /// Create a walker over `root` with the given exclusion rules.
    pub fn new(root: impl Into<PathBuf>, rules: ExclusionRules) -> Self {
        Self {
            root: root.into(),
            rules,
            event_sender: None,
        }
    }

    /// Report pruned subtrees through the event channel.
    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Iterate over every non-pruned entry, files and directories alike.
    /// Consumers typically skip directory entries and classify the files.
    pub fn run(self) -> impl Iterator<Item = Result<ignore::DirEntry, Error>> {
        let rules = self.rules;
        let sender = self.event_sender;

        WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                if !is_dir {
                    return true;
                }
                match rules.prune_reason(entry.path()) {
                    Some(reason) => {
                        if let Some(sender) = &sender {
                            sender.emit(AppEvent::Build(BuildEvent::SubtreePruned {
                                path: entry.path().to_path_buf(),
                                reason: reason.to_string(),
                            }));
                        }
                        false
                    }
                    None => true,
                }
            })
            .build()
            .map(|entry| entry.map_err(|err| traversal_error(&err).into()))
    }
}

fn traversal_error(err: &ignore::Error) -> BuildError {
    let path = match err {
        ignore::Error::WithPath { path, .. } => path.display().to_string(),
        _ => String::from("<unknown>"),
    };
    BuildError::TraversalFailed {
        path,
        message: err.to_string(),
    }
}
