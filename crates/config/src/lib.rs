// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gt-config: loads the keyed text configuration file described in spec
//! §4.1, searched across an ordered list of locations.

mod error;
mod locations;

pub use error::ConfigError;
pub use locations::default_locations;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Typed settings record produced by [`Config::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub pipeline_dir: PathBuf,
    pub pipeline_scan_interval: Duration,
    pub sqlite_dir: PathBuf,
    pub sqlite_app_name: String,
    pub sqlite_kv_name: String,
    pub sqlite_token: String,
    pub socket_file: PathBuf,
    pub pid_file: PathBuf,
    pub gluetube_log_file: PathBuf,
    pub http_proxy: String,
    pub https_proxy: String,

    /// The file(s) that were actually read, most-specific (last) first.
    /// Exposed for `--dev`-style diagnostics and for the rekey write-back.
    source_files: Vec<PathBuf>,
}

const KEYS: &[&str] = &[
    "PIPELINE_DIR",
    "PIPELINE_SCAN_INTERVAL",
    "SQLITE_DIR",
    "SQLITE_APP_NAME",
    "SQLITE_KV_NAME",
    "SQLITE_TOKEN",
    "SOCKET_FILE",
    "PID_FILE",
    "GLUETUBE_LOG_FILE",
    "HTTP_PROXY",
    "HTTPS_PROXY",
];

impl Config {
    /// Load the configuration, searching `locations` in order. Every
    /// readable file is parsed as a flat `KEY = "value"` table; later files
    /// override keys set by earlier ones, matching spec §4.1's "last
    /// readable file wins".
    pub fn load(locations: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut merged: BTreeMap<String, String> = BTreeMap::new();
        let mut source_files = Vec::new();

        for path in locations {
            let Ok(text) = std::fs::read_to_string(path) else {
                continue;
            };
            let table: toml::Table = text
                .parse()
                .map_err(|e| ConfigError::Parse(path.clone(), e.to_string()))?;
            for key in KEYS {
                if let Some(value) = table.get(*key) {
                    let value = value
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| value.to_string());
                    merged.insert((*key).to_string(), value);
                }
            }
            source_files.push(path.clone());
        }

        if source_files.is_empty() {
            return Err(ConfigError::NotFound(locations.to_vec()));
        }

        let get = |key: &str| -> Result<String, ConfigError> {
            merged
                .get(key)
                .cloned()
                .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
        };

        let scan_interval_secs: u64 = get("PIPELINE_SCAN_INTERVAL")?
            .parse()
            .map_err(|_| ConfigError::MissingKey("PIPELINE_SCAN_INTERVAL".to_string()))?;

        Ok(Config {
            pipeline_dir: PathBuf::from(get("PIPELINE_DIR")?),
            pipeline_scan_interval: Duration::from_secs(scan_interval_secs),
            sqlite_dir: PathBuf::from(get("SQLITE_DIR")?),
            sqlite_app_name: get("SQLITE_APP_NAME")?,
            sqlite_kv_name: get("SQLITE_KV_NAME")?,
            sqlite_token: get("SQLITE_TOKEN")?,
            socket_file: PathBuf::from(get("SOCKET_FILE")?),
            pid_file: PathBuf::from(get("PID_FILE")?),
            gluetube_log_file: PathBuf::from(get("GLUETUBE_LOG_FILE")?),
            http_proxy: merged.get("HTTP_PROXY").cloned().unwrap_or_default(),
            https_proxy: merged.get("HTTPS_PROXY").cloned().unwrap_or_default(),
            source_files,
        })
    }

    /// The most specific file this configuration was loaded from (the last
    /// readable location). Used by the rekey flow to write back
    /// `SQLITE_TOKEN`.
    pub fn primary_source_file(&self) -> &Path {
        // source_files is populated in search order, so the last entry is
        // the most specific (highest-priority) file.
        self.source_files
            .last()
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(""))
    }

    /// Atomically rewrite `SQLITE_TOKEN` in the primary source file. Used by
    /// the rekey RPC handler (spec §4.2) after re-encryption succeeds.
    pub fn write_back_sqlite_token(&mut self, new_token: &str) -> Result<(), ConfigError> {
        let path = self.primary_source_file().to_path_buf();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::NotFound(vec![]));
        }

        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
        let mut table: toml::Table = text
            .parse()
            .map_err(|e| ConfigError::Parse(path.clone(), e.to_string()))?;
        table.insert(
            "SQLITE_TOKEN".to_string(),
            toml::Value::String(new_token.to_string()),
        );

        let tmp_path = path.with_extension("tmp");
        std::fs::write(&tmp_path, table.to_string())
            .map_err(|e| ConfigError::Io(tmp_path.clone(), e))?;
        std::fs::rename(&tmp_path, &path).map_err(|e| ConfigError::Io(path.clone(), e))?;

        self.sqlite_token = new_token.to_string();
        Ok(())
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
