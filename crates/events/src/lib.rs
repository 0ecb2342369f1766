#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in cypack
//!
//! The build and provisioning workers never print or log directly; every
//! user-visible signal travels through this channel and is rendered by the
//! CLI. Events are grouped by functional domain (Build, Provision, General).

pub mod events;
pub use events::{AppEvent, BuildEvent, FailureContext, FileClassKind, GeneralEvent, ProvisionEvent};

use tokio::sync::mpsc::UnboundedSender;

/// Type alias for event sender using the `AppEvent` system
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for event receiver using the `AppEvent` system
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel with the `AppEvent` system
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout the cypack system
///
/// This trait provides a single, consistent API for emitting events regardless
/// of whether you have a raw `EventSender` or a struct that contains one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    /// Emit an operation started event
    fn emit_operation_started(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.into(),
        }));
    }

    /// Emit an operation completed event
    fn emit_operation_completed(&self, operation: impl Into<String>, success: bool) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.into(),
            success,
        }));
    }

    /// Emit an operation failed event
    fn emit_operation_failed(&self, operation: impl Into<String>, failure: FailureContext) {
        self.emit(AppEvent::General(GeneralEvent::OperationFailed {
            operation: operation.into(),
            failure,
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
/// This allows `EventSender` to be used directly where `EventEmitter` is expected
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emitter_delivers_in_order() {
        let (tx, mut rx) = channel();
        tx.emit_operation_started("build");
        tx.emit_operation_completed("build", true);

        match rx.recv().await {
            Some(AppEvent::General(GeneralEvent::OperationStarted { operation })) => {
                assert_eq!(operation, "build");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.recv().await {
            Some(AppEvent::General(GeneralEvent::OperationCompleted { success, .. })) => {
                assert!(success);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn emit_without_receiver_is_silent() {
        let (tx, rx) = channel();
        drop(rx);
        // Send errors are swallowed once the receiver is gone.
        tx.emit_debug("late event");
    }
}
