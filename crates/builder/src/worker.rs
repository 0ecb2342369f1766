//! Single-flight build worker handle

use cypack_errors::{BuildError, Error};
use tokio::task::JoinHandle;

use crate::builder::{BuildReport, Builder};
use crate::context::BuildContext;

/// Explicit handle for the one build task allowed per output target.
///
/// A second start while a handle is outstanding is rejected, never queued:
/// two concurrent runs would race on the same output tree. The front end
/// observes completion only through [`BuildWorker::wait`] and the event
/// channel, never through shared state.
#[derive(Default)]
pub struct BuildWorker {
    handle: Option<JoinHandle<Result<BuildReport, Error>>>,
}

impl BuildWorker {
    /// Create an idle worker
    #[must_use]
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Whether a build task is outstanding and unfinished
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn the build on its own task.
    ///
    /// # Errors
    ///
    /// Returns `OperationInProgress` if a previous build has not been
    /// awaited to completion yet.
    pub fn start(&mut self, builder: Builder, context: BuildContext) -> Result<(), Error> {
        if self.is_active() {
            return Err(BuildError::OperationInProgress.into());
        }
        self.handle = Some(tokio::spawn(async move { builder.build(context).await }));
        Ok(())
    }

    /// Await the outstanding build and release the handle.
    ///
    /// # Errors
    ///
    /// Returns the build's own error, or `WorkerFailed` if the task
    /// panicked or was aborted.
    pub async fn wait(&mut self) -> Result<BuildReport, Error> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| Error::internal("no build has been started"))?;
        handle.await.map_err(|e| {
            Error::from(BuildError::WorkerFailed {
                message: e.to_string(),
            })
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_start_is_rejected_while_active() {
        let mut worker = BuildWorker::new();
        // Stand-in for a long-running build task.
        worker.handle = Some(tokio::spawn(std::future::pending::<
            Result<BuildReport, Error>,
        >()));

        let err = worker
            .start(Builder::new(), BuildContext::new("a".into(), "b".into(), "c".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Build(BuildError::OperationInProgress)
        ));

        worker.handle.take().unwrap().abort();
    }

    #[tokio::test]
    async fn wait_without_start_is_an_error() {
        let mut worker = BuildWorker::new();
        assert!(worker.wait().await.is_err());
    }

    #[tokio::test]
    async fn worker_is_reusable_after_completion() {
        let mut worker = BuildWorker::new();
        worker.handle = Some(tokio::spawn(async {
            Err::<BuildReport, Error>(Error::internal("stub run"))
        }));
        let _ = worker.wait().await;
        assert!(!worker.is_active());
        // A fresh start is accepted once the previous handle is released.
        let source = tempfile::tempdir().unwrap();
        let entry = source.path().join("main.py");
        std::fs::write(&entry, b"print()\n").unwrap();
        let output = source.path().join("dist");
        let context = BuildContext::new(source.path().to_path_buf(), output, entry);
        worker.start(Builder::new(), context).unwrap();
        let _ = worker.wait().await;
    }
}
