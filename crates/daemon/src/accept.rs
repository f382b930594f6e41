// SPDX-License-Identifier: MIT

//! The accept/dispatch loop (spec §4.8): bind the socket, then repeatedly
//! accept → read → decode → dispatch → encode → write, one task per
//! connection. Mirrors the teacher's listener task shape.

use std::sync::Arc;

use gt_protocol::{read_request, write_response, ProtocolError, DEFAULT_TIMEOUT};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, warn};

use crate::ctx::DaemonCtx;
use crate::handlers;

pub struct Acceptor {
    listener: UnixListener,
    ctx: Arc<DaemonCtx>,
}

impl Acceptor {
    pub fn new(listener: UnixListener, ctx: Arc<DaemonCtx>) -> Self {
        Self { listener, ctx }
    }

    /// Accept connections until the listener itself errors out (socket
    /// removed from under it, fd exhaustion). Every per-connection error
    /// is logged and the loop continues (spec §4.8).
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(stream, &ctx).await {
                            match err {
                                ProtocolError::ConnectionClosed => debug!("client disconnected"),
                                ProtocolError::Timeout => warn!("connection timed out mid-request"),
                                other => error!(error = %other, "connection error"),
                            }
                        }
                    });
                }
                Err(err) => error!(error = %err, "accept error"),
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, ctx: &DaemonCtx) -> Result<(), ProtocolError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = read_request(&mut reader, DEFAULT_TIMEOUT).await?;
    debug!(request = ?request, "received request");

    let response = handlers::dispatch(request, ctx).await;
    debug!(response = ?response, "sending response");

    write_response(&mut writer, &response, DEFAULT_TIMEOUT).await
}
