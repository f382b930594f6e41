// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use gt_core::error::{ErrorKind, TaggedError};
use gt_core::id::RunId;
use gt_protocol::ProtocolError;
use gt_store::StoreError;
use thiserror::Error;

/// `RunnerError` from spec §7.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rpc error talking to the daemon: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("store error rendering pipeline variables: {0}")]
    Store(#[from] StoreError),

    #[error("environment setup failed for {dir}: {step}")]
    EnvironmentSetupFailed { dir: PathBuf, step: &'static str },

    #[error("daemon rejected request ({kind}): {message}")]
    DaemonRejected { kind: String, message: String },

    #[error("unexpected response from daemon: {0}")]
    UnexpectedResponse(String),

    #[error("pipeline {name} (run {run_id}) crashed")]
    PipelineCrashed { name: String, run_id: RunId },
}

impl TaggedError for RunnerError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Runner
    }
}
