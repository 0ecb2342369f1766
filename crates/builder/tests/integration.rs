//! Integration tests for the build pipeline
//!
//! The extension toolchain is exercised through stub interpreters (`true`
//! and `false` from coreutils) so the orchestration, staging, and failure
//! paths run without a Python installation.

use std::path::Path;

use cypack_builder::{BuildContext, Builder, BuildWorker};
use cypack_config::BuildConfig;
use cypack_errors::{BuildError, Error};
use cypack_events::{AppEvent, BuildEvent};
use tempfile::TempDir;

fn stub_builder(program: &str) -> Builder {
    Builder::with_config(BuildConfig {
        python: program.to_string(),
        ..BuildConfig::default()
    })
}

async fn write(path: &Path, contents: &[u8]) {
    tokio::fs::create_dir_all(path.parent().unwrap())
        .await
        .unwrap();
    tokio::fs::write(path, contents).await.unwrap();
}

/// Scenario A: package marker, module, data file, and entry point each
/// take their own route into the output tree.
#[tokio::test]
async fn mixed_tree_routes_every_class() {
    let source = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let output_root = output.path().join("dist");

    write(&source.path().join("pkg/__init__.py"), b"").await;
    write(&source.path().join("pkg/mod.py"), b"x = 1\n").await;
    write(&source.path().join("pkg/data.txt"), b"payload").await;
    write(&source.path().join("main.py"), b"print('hi')\n").await;

    let context = BuildContext::new(
        source.path().to_path_buf(),
        output_root.clone(),
        source.path().join("main.py"),
    );

    let report = stub_builder("true").build(context).await.unwrap();

    assert_eq!(report.modules_compiled, 1);
    assert_eq!(report.files_copied, 3);
    assert!(output_root.join("pkg/__init__.py").is_file());
    assert!(output_root.join("pkg/data.txt").is_file());
    assert!(output_root.join("main.py").is_file());
    // the module source itself never reaches the output tree
    assert!(!output_root.join("pkg/mod.py").exists());

    let entry = tokio::fs::read(output_root.join("main.py")).await.unwrap();
    assert_eq!(entry, b"print('hi')\n");
}

/// Scenario B: a subtree carrying an environment marker contributes zero
/// files, even though its contents would classify as assets or modules.
#[tokio::test]
async fn environment_subtree_is_fully_excluded() {
    let source = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let output_root = output.path().join("dist");

    write(&source.path().join("main.py"), b"").await;
    write(&source.path().join("deps/pyvenv.cfg"), b"home = /usr\n").await;
    write(&source.path().join("deps/lib/site.py"), b"").await;
    write(&source.path().join("deps/readme.txt"), b"").await;

    let context = BuildContext::new(
        source.path().to_path_buf(),
        output_root.clone(),
        source.path().join("main.py"),
    );

    let report = stub_builder("true").build(context).await.unwrap();

    assert_eq!(report.modules_compiled, 0);
    assert_eq!(report.files_copied, 1);
    assert!(!output_root.join("deps").exists());
}

/// Scenario C: a pre-existing output tree is destroyed before the run, so
/// only the current run's files remain.
#[tokio::test]
async fn stale_output_is_removed() {
    let source = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let output_root = output.path().join("dist");

    write(&output_root.join("stale.txt"), b"old").await;
    write(&output_root.join("old_pkg/leftover.py"), b"").await;
    write(&source.path().join("main.py"), b"").await;

    let context = BuildContext::new(
        source.path().to_path_buf(),
        output_root.clone(),
        source.path().join("main.py"),
    );

    stub_builder("true").build(context).await.unwrap();

    assert!(!output_root.join("stale.txt").exists());
    assert!(!output_root.join("old_pkg").exists());
    assert!(output_root.join("main.py").is_file());
}

/// Scenario E: a failing toolchain surfaces one aggregate error while the
/// already-copied passthrough files stay in place.
#[tokio::test]
async fn toolchain_failure_keeps_copied_files() {
    let source = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let output_root = output.path().join("dist");

    write(&source.path().join("pkg/__init__.py"), b"").await;
    write(&source.path().join("pkg/broken.py"), b"def f(:\n").await;
    write(&source.path().join("notes.txt"), b"keep me").await;
    write(&source.path().join("main.py"), b"").await;

    let (tx, mut rx) = cypack_events::channel();
    let context = BuildContext::new(
        source.path().to_path_buf(),
        output_root.clone(),
        source.path().join("main.py"),
    )
    .with_event_sender(tx);

    let err = stub_builder("false").build(context).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::ToolchainFailed { .. })
    ));

    assert!(output_root.join("pkg/__init__.py").is_file());
    assert!(output_root.join("notes.txt").is_file());
    assert!(output_root.join("main.py").is_file());
    assert!(!output_root.join("pkg/broken.py").exists());

    // exactly one failure event crosses the channel
    let mut failures = 0;
    while let Ok(event) = rx.try_recv() {
        if let AppEvent::Build(BuildEvent::Failed { .. }) = event {
            failures += 1;
        }
    }
    assert_eq!(failures, 1);
}

/// Running the pipeline twice yields byte-identical passthrough files.
#[tokio::test]
async fn reruns_are_idempotent_for_passthrough_files() {
    let source = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let output_root = output.path().join("dist");

    write(&source.path().join("pkg/__init__.py"), b"marker").await;
    write(&source.path().join("pkg/data.bin"), &[0u8, 1, 2, 255]).await;
    write(&source.path().join("main.py"), b"entry").await;

    let builder = stub_builder("true");
    for _ in 0..2 {
        let context = BuildContext::new(
            source.path().to_path_buf(),
            output_root.clone(),
            source.path().join("main.py"),
        );
        builder.build(context).await.unwrap();
    }

    let marker = tokio::fs::read(output_root.join("pkg/__init__.py"))
        .await
        .unwrap();
    let data = tokio::fs::read(output_root.join("pkg/data.bin")).await.unwrap();
    let entry = tokio::fs::read(output_root.join("main.py")).await.unwrap();
    assert_eq!(marker, b"marker");
    assert_eq!(data, &[0u8, 1, 2, 255]);
    assert_eq!(entry, b"entry");
}

/// Byte-compiled cache files are dropped both as loose files and via the
/// pruned cache directory.
#[tokio::test]
async fn cache_artifacts_never_reach_the_output() {
    let source = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let output_root = output.path().join("dist");

    write(&source.path().join("main.py"), b"").await;
    write(&source.path().join("stray.pyc"), b"\0").await;
    write(&source.path().join("__pycache__/mod.cpython-312.pyc"), b"\0").await;

    let context = BuildContext::new(
        source.path().to_path_buf(),
        output_root.clone(),
        source.path().join("main.py"),
    );

    let report = stub_builder("true").build(context).await.unwrap();

    assert_eq!(report.files_copied, 1);
    assert!(!output_root.join("stray.pyc").exists());
    assert!(!output_root.join("__pycache__").exists());
}

/// An invalid source root fails fast with its path in the error.
#[tokio::test]
async fn missing_source_root_is_rejected() {
    let output = TempDir::new().unwrap();
    let context = BuildContext::new(
        "/nonexistent/project".into(),
        output.path().join("dist"),
        "/nonexistent/project/main.py".into(),
    );

    let err = stub_builder("true").build(context).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Build(BuildError::SourceRootInvalid { .. })
    ));
}

/// The worker handle drives a full run to completion.
#[tokio::test]
async fn worker_runs_build_to_completion() {
    let source = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let output_root = output.path().join("dist");

    write(&source.path().join("pkg/__init__.py"), b"").await;
    write(&source.path().join("pkg/mod.py"), b"x = 1\n").await;
    write(&source.path().join("main.py"), b"").await;

    let context = BuildContext::new(
        source.path().to_path_buf(),
        output_root.clone(),
        source.path().join("main.py"),
    );

    let mut worker = BuildWorker::new();
    worker.start(stub_builder("true"), context).unwrap();
    let report = worker.wait().await.unwrap();

    assert_eq!(report.modules_compiled, 1);
    assert_eq!(report.output_root, output_root);
    assert!(!worker.is_active());
}
