// SPDX-License-Identifier: MIT

use gt_core::error::{ErrorKind, TaggedError};
use gt_db::DbError;
use gt_discovery::AutodiscoveryError;
use gt_protocol::ProtocolError;
use gt_runner::RunnerError;
use gt_scheduler::SchedulerError;
use gt_store::StoreError;
use thiserror::Error;

/// `DaemonError` from spec §7.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] gt_config::ConfigError),

    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("autodiscovery error: {0}")]
    Autodiscovery(#[from] AutodiscoveryError),

    #[error("rpc error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("another daemon is already running (pid file locked)")]
    AlreadyRunning,
}

impl TaggedError for DaemonError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Daemon
    }
}
