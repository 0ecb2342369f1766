#![deny(clippy::pedantic, unsafe_code)]
//! Staged extension builds for cypack
//!
//! This crate turns a Python project tree into a distributable build:
//! every file is classified, compilable modules are staged into a scratch
//! directory and handed to the Cython toolchain in one batch, and
//! everything else is copied verbatim into the output tree.

mod builder;
mod classify;
mod context;
mod staging;
mod toolchain;
mod walker;
mod worker;

pub use builder::{BuildReport, Builder};
pub use classify::{classify, FileClass, CACHE_SUFFIXES, MODULE_SUFFIX, PACKAGE_MARKER, STAGED_SUFFIX};
pub use context::BuildContext;
pub use staging::{module_name, module_relative_path, ExtensionUnit};
pub use toolchain::render_setup_script;
pub use walker::{is_virtualenv_dir, ExclusionRules, SourceWalker};
pub use worker::BuildWorker;
