//! Build context shared across the pipeline stages

use cypack_events::{EventEmitter, EventSender};
use std::path::PathBuf;

/// Inputs for one build run
#[derive(Clone, Debug)]
pub struct BuildContext {
    /// Project tree to build; never mutated
    pub source_root: PathBuf,
    /// Destination tree; destroyed and recreated at build start
    pub output_root: PathBuf,
    /// Designated entry point, always copied verbatim
    pub entry_point: PathBuf,
    /// Event sender for progress reporting
    pub event_sender: Option<EventSender>,
}

impl EventEmitter for BuildContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl BuildContext {
    /// Create new build context
    #[must_use]
    pub fn new(source_root: PathBuf, output_root: PathBuf, entry_point: PathBuf) -> Self {
        Self {
            source_root,
            output_root,
            entry_point,
            event_sender: None,
        }
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, event_sender: EventSender) -> Self {
        self.event_sender = Some(event_sender);
        self
    }
}
