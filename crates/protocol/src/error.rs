// SPDX-License-Identifier: MIT

use thiserror::Error;

use gt_core::error::{ErrorKind, TaggedError};

/// `rpcError` from spec §7.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("connection closed")]
    ConnectionClosed,

    #[error("timed out waiting for a message")]
    Timeout,
}

impl TaggedError for ProtocolError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Rpc
    }
}
