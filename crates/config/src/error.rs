// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

use gt_core::error::{ErrorKind, TaggedError};

/// `ConfigError` from spec §7.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the configuration file could not be found in any of the following locations: {0:?}")]
    NotFound(Vec<PathBuf>),

    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, String),

    #[error("missing required configuration key: {0}")]
    MissingKey(String),

    #[error("failed to read/write config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
}

impl TaggedError for ConfigError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Config
    }
}
