// SPDX-License-Identifier: MIT

use thiserror::Error;

use gt_core::error::{ErrorKind, TaggedError};
use gt_core::id::ScheduleId;

/// Scheduler-side errors. Not named directly in spec §7 (the scheduler is
/// an in-memory component the daemon drives), so this is reported under
/// `RunnerError` by callers that surface it over RPC.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid cron expression {0:?}: {1}")]
    InvalidCron(String, String),

    #[error("invalid timestamp {0:?}: {1}")]
    InvalidAt(String, String),

    #[error("schedule {0} is not registered")]
    NotFound(ScheduleId),
}

impl TaggedError for SchedulerError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Runner
    }
}
