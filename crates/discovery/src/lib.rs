// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Pipeline auto-discovery (spec §4.7): a periodic scan that reconciles
//! `pipeline_dir` against the pipeline table, translated from
//! `gluetube/autodiscovery.py::PipelineScanner`.
//!
//! Like [`gt_runner`], discovery never writes to the database or
//! scheduler directly: it holds a read-only [`gt_db::Db`] handle for the
//! comparison and emits `set_pipeline`/`delete_pipeline` RPCs back to the
//! daemon's own socket for the actual mutation, keeping the daemon's
//! accept/dispatch loop the sole writer (spec §5).

mod diff;
mod error;
mod names;
mod scan;

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use gt_db::Db;
use gt_protocol::{Request, Response};

pub use error::AutodiscoveryError;
pub use scan::FsPipeline;

/// The result of one scan: the names assigned to newly created pipelines
/// and how many stale ones were removed. Exposed mainly for tests and
/// logging; the daemon itself only needs the side effects.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScanOutcome {
    pub created: Vec<String>,
    pub deleted: usize,
}

pub struct Discovery {
    db: Db,
    pipeline_dir: PathBuf,
    socket_file: PathBuf,
}

impl Discovery {
    pub fn new(db: Db, pipeline_dir: PathBuf, socket_file: PathBuf) -> Self {
        Self { db, pipeline_dir, socket_file }
    }

    /// Run one scan-and-reconcile pass (spec §4.7).
    pub async fn scan_once(&self) -> Result<ScanOutcome, AutodiscoveryError> {
        let fs_pipelines = scan::scan(&self.pipeline_dir)?;
        let db_pipelines = self.db.all_pipelines_scheduling().await?;

        let diff::Diff { to_create, to_delete } = diff::diff(&fs_pipelines, &db_pipelines);

        let mut existing_names: HashSet<String> =
            db_pipelines.iter().map(|p| p.name.clone()).collect();

        let mut outcome = ScanOutcome::default();

        for stale in &to_delete {
            expect_ok(
                gt_protocol::call(
                    &self.socket_file,
                    &Request::DeletePipeline { pipeline_id: stale.pipeline_id.get() },
                )
                .await?,
            )?;
            outcome.deleted += 1;
        }

        for fresh in &to_create {
            let name = names::generate(&existing_names);
            existing_names.insert(name.clone());

            expect_pipeline_id(
                gt_protocol::call(
                    &self.socket_file,
                    &Request::SetPipeline {
                        name: name.clone(),
                        py_name: fresh.py_name.clone(),
                        dir_name: fresh.dir_name.clone(),
                        py_timestamp: fresh.py_timestamp,
                    },
                )
                .await?,
            )?;
            outcome.created.push(name);
        }

        Ok(outcome)
    }

    /// Spawn the periodic scan loop as a background task (spec §4.7's
    /// "periodic job, interval from config"). Mirrors the scheduler's
    /// `spawn_tick_loop`: every error is logged and the loop continues,
    /// matching the daemon's own "every error path logs and continues"
    /// rule (spec §4.8).
    pub fn spawn_scan_loop(self, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match self.scan_once().await {
                    Ok(outcome) => {
                        if !outcome.created.is_empty() || outcome.deleted > 0 {
                            tracing::info!(
                                created = ?outcome.created,
                                deleted = outcome.deleted,
                                "autodiscovery scan reconciled pipelines"
                            );
                        }
                    }
                    Err(err) => tracing::error!(error = %err, "autodiscovery scan failed"),
                }
            }
        })
    }
}

fn expect_ok(response: Response) -> Result<(), AutodiscoveryError> {
    match response {
        Response::Ok => Ok(()),
        Response::Error { kind, message } => Err(AutodiscoveryError::DaemonRejected { kind, message }),
        other => Err(AutodiscoveryError::UnexpectedResponse(format!("{other:?}"))),
    }
}

fn expect_pipeline_id(response: Response) -> Result<(), AutodiscoveryError> {
    match response {
        Response::PipelineId { .. } => Ok(()),
        Response::Error { kind, message } => Err(AutodiscoveryError::DaemonRejected { kind, message }),
        other => Err(AutodiscoveryError::UnexpectedResponse(format!("{other:?}"))),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
