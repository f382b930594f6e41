// SPDX-License-Identifier: MIT

//! Request/response DTOs for the daemon's IPC protocol (spec §6's RPC
//! method table). The daemon dispatches on `Request`'s tag with an explicit
//! handler per variant (spec §9 Design Notes), rather than any
//! reflection-based method lookup.

use serde::{Deserialize, Serialize};

/// A request sent from a client (the CLI, or a pipeline's `stage_report`
/// helper) to the daemon over the control socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check.
    Ping,

    /// Register a pipeline discovered on disk (spec §4.4).
    SetPipeline {
        name: String,
        py_name: String,
        dir_name: String,
        py_timestamp: f64,
    },

    /// Remove a pipeline no longer present on disk (spec §4.4).
    DeletePipeline { pipeline_id: i64 },

    /// Create a schedule for a pipeline. At most one of `cron`/`at` may be
    /// non-empty.
    SetSchedule {
        pipeline_id: i64,
        #[serde(default)]
        cron: String,
        #[serde(default)]
        at: String,
        #[serde(default)]
        paused: bool,
        #[serde(default)]
        retry_on_crash: bool,
        #[serde(default)]
        max_retries: i64,
    },

    /// Replace a schedule's cron expression, clearing `at`.
    SetScheduleCron { schedule_id: i64, cron: String },

    /// Replace a schedule's one-shot `at` timestamp, clearing `cron`.
    SetScheduleAt { schedule_id: i64, at: String },

    /// Park a schedule: clear both `cron` and `at` without changing
    /// `paused` (spec §9 Open Question decision).
    SetScheduleNow { schedule_id: i64 },

    /// Delete a schedule and, via cascade, its run history.
    DeleteSchedule { schedule_id: i64 },

    /// Point a schedule's `latest_run` at a run.
    SetScheduleLatestRun { schedule_id: i64, run_id: i64 },

    /// Begin a new run for a pipeline/schedule pair.
    SetPipelineRun {
        pipeline_id: i64,
        schedule_id: i64,
        start_time: String,
    },

    /// Update a run's status.
    SetPipelineRunStatus { run_id: i64, status: String },

    /// Record a run's current stage and human-readable progress message
    /// (the `stage_report` helper's wire counterpart).
    SetPipelineRunStageAndStageMsg {
        run_id: i64,
        stage: i64,
        #[serde(default)]
        stage_msg: Option<String>,
    },

    /// Finalize a run with its terminal status, optional exit message, and
    /// end timestamp.
    SetPipelineRunFinished {
        run_id: i64,
        status: String,
        #[serde(default)]
        exit_msg: Option<String>,
        end_time: String,
    },

    /// Set a key in the encrypted store. `table` defaults to `"common"`
    /// (spec §6) when omitted.
    SetKeyValue {
        key: String,
        value: String,
        #[serde(default)]
        table: Option<String>,
    },

    /// Delete a key from the encrypted store. `table` defaults to
    /// `"common"` (spec §6) when omitted.
    DeleteKey {
        key: String,
        #[serde(default)]
        table: Option<String>,
    },

    /// Re-encrypt every stored value under a new master secret (spec §4.2).
    RekeyDb { new_secret: String },
}

/// A response sent from the daemon back to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Reply to [`Request::Ping`].
    Pong,

    /// Generic success with no payload.
    Ok,

    /// A newly assigned pipeline id.
    PipelineId { id: i64 },

    /// A newly assigned schedule id.
    ScheduleId { id: i64 },

    /// A newly assigned run id.
    RunId { id: i64 },

    /// The request failed. `kind` is one of the spec §7 error taxonomy
    /// names (`"dbError"`, `"StoreError"`, and so on).
    Error { kind: String, message: String },
}

impl Response {
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Response::Error {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
