// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The pipeline runner (spec §4.6): per-run dependency environment setup,
//! variable templating, process supervision, and lifecycle reporting.
//!
//! The runner executes inside the daemon's worker pool (concurrency domain
//! b, spec §5) but never touches the database or scheduler directly — every
//! mutation, including its own run bookkeeping, goes back over the control
//! socket as an RPC call, the same path a pipeline's own [`stage`] reports
//! take. This keeps the daemon's accept/dispatch loop the sole writer.

mod environment;
mod error;
mod spawn;
pub mod stage;
mod template;

use std::path::PathBuf;

use gt_core::id::{PipelineId, RunId, ScheduleId};
use gt_core::{Clock, SystemClock};
use gt_protocol::{Request, Response};
use gt_store::Store;

pub use error::RunnerError;
pub use stage::{report_stage, report_status};

/// A pipeline fire handed off by the scheduler (spec §4.5's `DueJob`,
/// enriched with the pipeline identity the runner needs).
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub pipeline_id: PipelineId,
    pub schedule_id: ScheduleId,
    pub name: String,
    pub py_name: String,
    pub dir_name: String,
}

/// Runs one pipeline process per [`Runner::run`] call (spec §4.6).
pub struct Runner<C: Clock = SystemClock> {
    store: Store,
    pipeline_dir: PathBuf,
    socket_file: PathBuf,
    master_secret: String,
    http_proxy: String,
    https_proxy: String,
    clock: C,
}

impl<C: Clock> Runner<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Store,
        pipeline_dir: PathBuf,
        socket_file: PathBuf,
        master_secret: String,
        http_proxy: String,
        https_proxy: String,
        clock: C,
    ) -> Self {
        Self {
            store,
            pipeline_dir,
            socket_file,
            master_secret,
            http_proxy,
            https_proxy,
            clock,
        }
    }

    /// Run one pipeline fire to completion (spec §4.6 steps 1-5).
    ///
    /// Returns the finished run's id on a zero exit. A crashing pipeline
    /// is durably recorded as `crashed` before this returns
    /// [`RunnerError::PipelineCrashed`] — the crash is never dropped on
    /// the floor even though it surfaces as an error to the caller.
    pub async fn run(&self, job: RunRequest) -> Result<RunId, RunnerError> {
        let dir_abs_path = self.pipeline_dir.join(&job.dir_name);

        let interpreter = environment::ensure(&dir_abs_path, &self.http_proxy, &self.https_proxy).await?;

        let source = tokio::fs::read_to_string(dir_abs_path.join(&job.py_name)).await?;
        let rendered = template::render(&source, &self.store, &self.master_secret).await?;

        let start_time = self.clock.now().to_rfc3339();
        let run_id = expect_run_id(
            gt_protocol::call(
                &self.socket_file,
                &Request::SetPipelineRun {
                    pipeline_id: job.pipeline_id.get(),
                    schedule_id: job.schedule_id.get(),
                    start_time,
                },
            )
            .await?,
        )?;

        expect_ok(
            gt_protocol::call(
                &self.socket_file,
                &Request::SetScheduleLatestRun {
                    schedule_id: job.schedule_id.get(),
                    run_id: run_id.get(),
                },
            )
            .await?,
        )?;

        let output =
            spawn::run_pipeline(&interpreter, &dir_abs_path, &rendered, run_id, &self.socket_file).await?;
        let end_time = self.clock.now().to_rfc3339();

        if output.status.success() {
            expect_ok(
                gt_protocol::call(
                    &self.socket_file,
                    &Request::SetPipelineRunFinished {
                        run_id: run_id.get(),
                        status: "finished".to_string(),
                        exit_msg: None,
                        end_time,
                    },
                )
                .await?,
            )?;
            Ok(run_id)
        } else {
            let exit_msg = spawn::captured_output(&output);
            expect_ok(
                gt_protocol::call(
                    &self.socket_file,
                    &Request::SetPipelineRunFinished {
                        run_id: run_id.get(),
                        status: "crashed".to_string(),
                        exit_msg: Some(exit_msg),
                        end_time,
                    },
                )
                .await?,
            )?;
            // The captured output is already durably recorded; it must not
            // also ride along in the error (spec §7: no secrets surfaced
            // past the database).
            Err(RunnerError::PipelineCrashed { name: job.name, run_id })
        }
    }
}

fn expect_ok(response: Response) -> Result<(), RunnerError> {
    match response {
        Response::Ok => Ok(()),
        Response::Error { kind, message } => Err(RunnerError::DaemonRejected { kind, message }),
        other => Err(RunnerError::UnexpectedResponse(format!("{other:?}"))),
    }
}

fn expect_run_id(response: Response) -> Result<RunId, RunnerError> {
    match response {
        Response::RunId { id } => Ok(RunId::new(id)),
        Response::Error { kind, message } => Err(RunnerError::DaemonRejected { kind, message }),
        other => Err(RunnerError::UnexpectedResponse(format!("{other:?}"))),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
