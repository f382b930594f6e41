// SPDX-License-Identifier: MIT

use gt_core::error::{ErrorKind, TaggedError};
use gt_db::DbError;
use gt_protocol::ProtocolError;
use thiserror::Error;

/// `AutodiscoveryError` from spec §7.
#[derive(Debug, Error)]
pub enum AutodiscoveryError {
    #[error("io error scanning {dir}: {source}")]
    Io { dir: std::path::PathBuf, source: std::io::Error },

    #[error("reading the pipeline table: {0}")]
    Db(#[from] DbError),

    #[error("rpc error talking to the daemon: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("daemon rejected request ({kind}): {message}")]
    DaemonRejected { kind: String, message: String },

    #[error("unexpected response from daemon: {0}")]
    UnexpectedResponse(String),
}

impl TaggedError for AutodiscoveryError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Autodiscovery
    }
}
