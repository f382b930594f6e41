// SPDX-License-Identifier: MIT

//! Daemon startup and shutdown (spec §4.8/§5): acquire the pid file lock,
//! bind the control socket (unlinking a stale one first), and the
//! matching teardown. Translated from `gluetube/daemon.py`'s startup
//! sequence and this teacher's own `lifecycle::startup`/`shutdown` shape.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use fs2::FileExt;
use gt_config::Config;
use tokio::net::UnixListener;
use tracing::info;

use crate::error::DaemonError;

/// Holds the daemon's process-wide resources for the duration of its
/// lifetime. Dropping this releases the pid file lock.
pub struct Daemon {
    pub config: Config,
    #[allow(dead_code)]
    lock_file: File,
}

impl Daemon {
    /// Acquire the pid lock and bind the control socket. Fails with
    /// [`DaemonError::AlreadyRunning`] if another daemon already holds the
    /// lock (spec §5: the pid file is written with the daemon's own pid).
    pub fn startup(config: Config) -> Result<(Self, UnixListener), DaemonError> {
        if let Some(parent) = config.pid_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let lock_file =
            std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(&config.pid_file)?;
        lock_file.try_lock_exclusive().map_err(|_| DaemonError::AlreadyRunning)?;

        let mut lock_file = lock_file;
        lock_file.set_len(0)?;
        writeln!(lock_file, "{}", std::process::id())?;

        if config.socket_file.exists() {
            std::fs::remove_file(&config.socket_file)?;
        }
        if let Some(parent) = config.socket_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let listener = UnixListener::bind(&config.socket_file)?;

        info!(socket = %config.socket_file.display(), "daemon bound control socket");
        Ok((Self { config, lock_file }, listener))
    }

    /// Remove the socket and pid files. The lock itself is released when
    /// `lock_file` drops.
    pub fn shutdown(&self) {
        if self.config.socket_file.exists() {
            let _ = std::fs::remove_file(&self.config.socket_file);
        }
        if self.config.pid_file.exists() {
            let _ = std::fs::remove_file(&self.config.pid_file);
        }
        info!("daemon shutdown complete");
    }
}

/// The default search path for the configuration file (spec §4.1),
/// checked in order: current directory, then `$HOME/.gluetube/`, then
/// `/etc/gluetube/`.
pub fn default_config_locations() -> Vec<PathBuf> {
    gt_config::default_locations()
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
