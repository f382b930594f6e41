// SPDX-License-Identifier: MIT

//! A one-shot RPC client over the control socket, used by the runner and by
//! pipeline processes reporting their own progress (spec §4.6/§4.8). Each
//! call opens a fresh connection, sends one request, and reads back one
//! response — gluetube pipelines are short-lived callers, not a persistent
//! session.

use std::path::Path;

use tokio::net::UnixStream;

use crate::types::{Request, Response};
use crate::wire::{self, DEFAULT_TIMEOUT};
use crate::ProtocolError;

/// Connect to `socket_file`, send `request`, and return the daemon's
/// response.
pub async fn call(socket_file: &Path, request: &Request) -> Result<Response, ProtocolError> {
    call_with_timeout(socket_file, request, DEFAULT_TIMEOUT).await
}

pub async fn call_with_timeout(
    socket_file: &Path,
    request: &Request,
    timeout: std::time::Duration,
) -> Result<Response, ProtocolError> {
    let mut stream = tokio::time::timeout(timeout, UnixStream::connect(socket_file))
        .await
        .map_err(|_| ProtocolError::Timeout)??;

    let data = wire::encode(request)?;
    wire::write_message(&mut stream, &data).await?;
    let bytes = tokio::time::timeout(timeout, wire::read_message(&mut stream))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    wire::decode(&bytes)
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
