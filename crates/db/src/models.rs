// SPDX-License-Identifier: MIT

use gt_core::id::{PipelineId, RunId, ScheduleId};

/// A `Pipeline` row (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub id: PipelineId,
    pub name: String,
    pub py_name: String,
    pub dir_name: String,
    pub py_timestamp: f64,
}

/// A `Schedule` row (spec §3). `cron`/`at` are empty strings, never
/// `NULL`, so "parked" is representable as `cron.is_empty() && at.is_empty()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub id: ScheduleId,
    pub pipeline_id: PipelineId,
    pub cron: String,
    pub at: String,
    pub paused: bool,
    pub retry_on_crash: bool,
    pub retry_num: i64,
    pub max_retries: i64,
    pub latest_run: Option<RunId>,
}

impl Schedule {
    /// True if neither `cron` nor `at` is set (spec §3's "parked" state).
    pub fn is_parked(&self) -> bool {
        self.cron.is_empty() && self.at.is_empty()
    }
}

/// A `Run` row (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub id: RunId,
    pub pipeline_id: PipelineId,
    pub schedule_id: ScheduleId,
    pub status: String,
    pub stage: i64,
    pub stage_msg: Option<String>,
    pub exit_msg: Option<String>,
    pub start_time: String,
    pub end_time: Option<String>,
}

/// One row of `all_pipelines_scheduling()` (spec §4.3): a pipeline
/// left-joined to a schedule. `schedule_id` is `None` for a pipeline with
/// no schedules, which should not normally happen (auto-discovery always
/// creates one) but is representable.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineScheduling {
    pub pipeline_id: PipelineId,
    pub name: String,
    pub py_name: String,
    pub dir_name: String,
    pub schedule_id: Option<ScheduleId>,
    pub cron: String,
    pub at: String,
    pub paused: bool,
}

/// One row of `summary_pipelines()` (spec §4.3): the CLI's tabular read.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSummary {
    pub name: String,
    pub py_name: String,
    pub schedule_id: Option<ScheduleId>,
    pub cron: String,
    pub at: String,
    pub paused: bool,
    pub latest_run_status: Option<String>,
    pub latest_run_stage_msg: Option<String>,
    pub latest_run_end_time: Option<String>,
}
