// SPDX-License-Identifier: MIT

//! The error taxonomy named in spec §7. Each crate defines its own
//! `thiserror` enum for its domain; `ErrorKind` is the shared tag used when
//! a caller (the daemon's dispatch table, the log lines it writes) needs to
//! group errors without matching on every concrete type.

use std::fmt;

/// One of the seven error kinds named in spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Store,
    Db,
    Runner,
    Daemon,
    Rpc,
    Autodiscovery,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Config => "ConfigError",
            ErrorKind::Store => "StoreError",
            ErrorKind::Db => "dbError",
            ErrorKind::Runner => "RunnerError",
            ErrorKind::Daemon => "DaemonError",
            ErrorKind::Rpc => "rpcError",
            ErrorKind::Autodiscovery => "AutodiscoveryError",
        };
        write!(f, "{s}")
    }
}

/// Implemented by each crate's error enum so handlers can report which
/// taxonomy kind an error belongs to without downcasting.
pub trait TaggedError: std::error::Error {
    fn kind(&self) -> ErrorKind;
}
