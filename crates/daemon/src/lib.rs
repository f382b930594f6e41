// SPDX-License-Identifier: MIT

//! The Gluetube daemon library: RPC dispatch (spec §9 Design Notes) and
//! process lifecycle (spec §4.8/§5), shared between the `gluetubed`
//! binary and its integration tests.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod accept;
pub mod ctx;
pub mod error;
pub mod handlers;
pub mod lifecycle;

pub use ctx::DaemonCtx;
pub use error::DaemonError;
