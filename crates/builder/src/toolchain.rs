//! Batch invocation of the Cython extension toolchain

use std::fmt::Write as _;
use std::path::Path;

use cypack_errors::{BuildError, Error};
use tokio::fs;
use tokio::process::Command;

use crate::staging::ExtensionUnit;

const SETUP_SCRIPT: &str = "setup.py";
const CYTHON_BUILD_DIR: &str = "cython_build";

/// Render the batch setup script enumerating every staged module.
///
/// The toolchain is driven through one generated script rather than
/// per-module invocations; the compiler aggregates its own diagnostics.
#[must_use]
pub fn render_setup_script(units: &[ExtensionUnit], staging_root: &Path) -> String {
    let mut script = String::from(
        "from setuptools import setup, Extension\nfrom Cython.Build import cythonize\n\nextensions = [\n",
    );
    for unit in units {
        let _ = writeln!(
            script,
            "    Extension(name={}, sources=[{}]),",
            py_str(&unit.module_name),
            py_str(&unit.staged_source.display().to_string()),
        );
    }
    let _ = write!(
        script,
        "]\n\nsetup(\n    ext_modules=cythonize(\n        extensions,\n        compiler_directives={{\"language_level\": \"3\"}},\n        build_dir={},\n    ),\n)\n",
        py_str(&staging_root.join(CYTHON_BUILD_DIR).display().to_string()),
    );
    script
}

/// Compile the staged modules into the output tree in one toolchain run.
///
/// The staging root serves as scratch space and working directory; the
/// output root is the link target. A nonzero toolchain outcome is reported
/// as a single aggregate failure carrying the toolchain's own diagnostics.
///
/// # Errors
///
/// Returns `ToolchainMissing` if the interpreter cannot be located and
/// `ToolchainFailed` for any unsuccessful invocation.
pub async fn compile_extensions(
    python: &str,
    units: &[ExtensionUnit],
    output_root: &Path,
    staging_root: &Path,
) -> Result<(), Error> {
    let interpreter = which::which(python).map_err(|_| BuildError::ToolchainMissing {
        program: python.to_string(),
    })?;

    let script_path = staging_root.join(SETUP_SCRIPT);
    let script = render_setup_script(units, staging_root);
    fs::write(&script_path, script)
        .await
        .map_err(|e| Error::io_with_path(&e, &script_path))?;

    let output = Command::new(&interpreter)
        .arg(SETUP_SCRIPT)
        .arg("build_ext")
        .arg("--build-lib")
        .arg(output_root)
        .current_dir(staging_root)
        .output()
        .await
        .map_err(|e| BuildError::ToolchainFailed {
            message: format!("failed to execute {}: {e}", interpreter.display()),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut message = format!("extension build exited with {}", output.status);
        if !stdout.trim().is_empty() {
            let _ = write!(message, "\n{}", stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            let _ = write!(message, "\n{}", stderr.trim_end());
        }
        return Err(BuildError::ToolchainFailed { message }.into());
    }

    Ok(())
}

/// Quote a string as a Python literal.
fn py_str(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}
