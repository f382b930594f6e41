// SPDX-License-Identifier: MIT

use thiserror::Error;

use gt_core::error::{ErrorKind, TaggedError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("plaintext value must not be empty")]
    EmptyPlaintext,

    #[error("invalid key material")]
    InvalidKey,

    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed (wrong key or corrupted value)")]
    Decrypt,

    #[error("malformed ciphertext blob")]
    Malformed,
}

impl TaggedError for CryptoError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Store
    }
}
