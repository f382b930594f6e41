// SPDX-License-Identifier: MIT

//! Package metadata, mirroring `gluetube/metadata.py`. Used by the daemon's
//! `--version` flag and startup log line.

/// Crate name, e.g. for log banners and `--version` output.
pub const NAME: &str = "gluetube";

/// Version string, taken from the workspace's `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `"gluetube 0.1.0"` formatted banner.
pub fn banner() -> String {
    format!("{NAME} {VERSION}")
}
