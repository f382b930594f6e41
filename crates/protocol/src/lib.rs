// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The wire protocol spoken over the daemon's control socket (spec §4.7):
//! a length-prefixed JSON codec plus the request/response types for every
//! RPC method in spec §6.

mod client;
mod error;
mod types;
mod wire;

pub use client::{call, call_with_timeout};
pub use error::ProtocolError;
pub use types::{Request, Response};
pub use wire::{decode, encode, read_message, read_request, write_message, write_response, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE};
