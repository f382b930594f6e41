// SPDX-License-Identifier: MIT

use thiserror::Error;

use gt_core::error::{ErrorKind, TaggedError};
use gt_crypto::CryptoError;

/// `StoreError` from spec §7.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no value for key {0:?}")]
    NotFound(String),

    #[error("key must not be empty")]
    EmptyKey,

    #[error("invalid table name {0:?}: must be ASCII alphanumeric/underscore, not starting with a digit")]
    InvalidTableName(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("database error: {0}")]
    Backend(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err)
    }
}

impl TaggedError for StoreError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Store
    }
}
