// SPDX-License-Identifier: MIT

//! The `stage` decorator equivalent (spec §9 Design Notes, §12
//! supplemented feature): a plain function a pipeline process calls before
//! a step, rather than the original's `@stage` Python decorator. A
//! pipeline is just another RPC client — it dials `SOCKET_FILE` fresh for
//! each call, same as [`crate::runner`]'s internal calls back to the
//! daemon.

use std::path::Path;

use gt_core::id::RunId;
use gt_protocol::Request;

use crate::error::RunnerError;
use crate::expect_ok;

/// Report a run's current stage and an optional human-readable message
/// (spec §4.6's `set_pipeline_run_stage_and_stage_msg`). Call this before
/// each logical step of a pipeline.
pub async fn report_stage(
    socket_file: &Path,
    run_id: RunId,
    stage: i64,
    stage_msg: Option<&str>,
) -> Result<(), RunnerError> {
    let response = gt_protocol::call(
        socket_file,
        &Request::SetPipelineRunStageAndStageMsg {
            run_id: run_id.get(),
            stage,
            stage_msg: stage_msg.map(str::to_string),
        },
    )
    .await?;
    expect_ok(response)
}

/// Report a run's status directly (spec §4.6's `set_pipeline_run_status`),
/// for pipelines that want to signal something other than a stage change.
pub async fn report_status(socket_file: &Path, run_id: RunId, status: &str) -> Result<(), RunnerError> {
    let response = gt_protocol::call(
        socket_file,
        &Request::SetPipelineRunStatus {
            run_id: run_id.get(),
            status: status.to_string(),
        },
    )
    .await?;
    expect_ok(response)
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
