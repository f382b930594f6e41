// SPDX-License-Identifier: MIT

//! Process supervision (spec §4.6 step 4), grounded in the teacher's
//! subprocess helper (`oj-adapters::subprocess::run_with_timeout`):
//! `tokio::process::Command`, waited to completion with its output
//! captured.

use std::path::Path;
use std::process::{Output, Stdio};

use gt_core::id::RunId;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::RunnerError;

/// Spawn the rendered pipeline program with `interpreter`, feeding it over
/// standard input and extending the environment with `PIPELINE_RUN_ID` and
/// `SOCKET_FILE` (spec §4.6 step 4). Returns the exit status with stdout
/// and stderr captured.
pub async fn run_pipeline(
    interpreter: &Path,
    dir_abs_path: &Path,
    rendered_program: &str,
    run_id: RunId,
    socket_file: &Path,
) -> Result<Output, RunnerError> {
    let mut child = Command::new(interpreter)
        .arg("-")
        .current_dir(dir_abs_path)
        .env("PIPELINE_RUN_ID", run_id.get().to_string())
        .env("SOCKET_FILE", socket_file)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let mut stdin = child.stdin.take().ok_or_else(|| {
        std::io::Error::other("child process stdin was not piped")
    })?;
    stdin.write_all(rendered_program.as_bytes()).await?;
    drop(stdin);

    Ok(child.wait_with_output().await?)
}

/// The combined stdout+stderr text recorded as a run's `exit_msg` on crash
/// (spec §4.6 step 5). Streams are concatenated rather than interleaved —
/// merging them byte-for-byte would require duplicating a raw file
/// descriptor, which this workspace's `unsafe_code = "forbid"` lint rules
/// out.
pub fn captured_output(output: &Output) -> String {
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.stderr.is_empty() {
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
    }
    combined
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
