// SPDX-License-Identifier: MIT

//! The per-pipeline isolated dependency environment (spec §4.6 step 1),
//! grounded in `gluetube/runner.py`'s venv handling: one interpreter tree
//! per pipeline directory, created on first run, with its dependency
//! manifest reinstalled on every run because it may have changed since the
//! last one.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::RunnerError;

const VENV_DIR: &str = ".venv";
const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Ensure `dir_abs_path/.venv` exists, creating it if this is the
/// pipeline's first run, then install its dependency manifest if present.
/// Returns the path to the environment's interpreter.
pub async fn ensure(
    dir_abs_path: &Path,
    http_proxy: &str,
    https_proxy: &str,
) -> Result<PathBuf, RunnerError> {
    let venv_dir = dir_abs_path.join(VENV_DIR);

    if !venv_dir.is_dir() {
        let status = Command::new("python3")
            .arg("-m")
            .arg("venv")
            .arg(&venv_dir)
            .status()
            .await?;
        if !status.success() {
            return Err(RunnerError::EnvironmentSetupFailed {
                dir: dir_abs_path.to_path_buf(),
                step: "venv creation",
            });
        }
    }

    let requirements = dir_abs_path.join(REQUIREMENTS_FILE);
    if requirements.is_file() {
        let pip = venv_dir.join("bin").join("pip3");
        let status = Command::new(&pip)
            .arg("install")
            .arg("-r")
            .arg(REQUIREMENTS_FILE)
            .current_dir(dir_abs_path)
            .env("HTTP_PROXY", http_proxy)
            .env("HTTPS_PROXY", https_proxy)
            .status()
            .await?;
        if !status.success() {
            return Err(RunnerError::EnvironmentSetupFailed {
                dir: dir_abs_path.to_path_buf(),
                step: "dependency install",
            });
        }
    }

    Ok(venv_dir.join("bin").join("python3"))
}

#[cfg(test)]
#[path = "environment_tests.rs"]
mod tests;
