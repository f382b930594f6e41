// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gt-crypto: key derivation and symmetric encryption backing the Store
//! (spec §4.2) and its rekey flow.
//!
//! Each value is encrypted independently with a key derived from the
//! master secret and a random per-value salt (PBKDF2-HMAC-SHA256, >=100k
//! iterations, per spec §4.2), then sealed with AES-256-GCM. The on-disk
//! encoding is `base64(salt(16) || nonce(12) || ciphertext)` so a single
//! `TEXT` column holds everything needed to decrypt.

mod error;

pub use error::CryptoError;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

/// Minimum PBKDF2 iteration count required by spec §4.2.
pub const MIN_ITERATIONS: u32 = 100_000;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Derive a 32-byte AES-256 key from `master_secret` and `salt` using
/// PBKDF2-HMAC-SHA256 with [`MIN_ITERATIONS`] rounds.
fn derive_key(master_secret: &str, salt: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(master_secret.as_bytes(), salt, MIN_ITERATIONS, &mut key);
    key
}

/// Encrypt `plaintext` under `master_secret`, returning a base64-encoded
/// blob safe to store in a single text column.
///
/// Fails if `plaintext` is empty, per spec §4.2 ("empty key or empty
/// plaintext value must fail with `StoreError`" — the Store layer maps
/// `CryptoError::EmptyPlaintext` into that).
pub fn encrypt(master_secret: &str, plaintext: &str) -> Result<String, CryptoError> {
    if plaintext.is_empty() {
        return Err(CryptoError::EmptyPlaintext);
    }

    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let mut key = derive_key(master_secret, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::InvalidKey)?;
    key.zeroize();

    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| CryptoError::Encrypt)?;

    let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);

    Ok(base64::engine::general_purpose::STANDARD.encode(blob))
}

/// Decrypt a blob produced by [`encrypt`] under `master_secret`.
pub fn decrypt(master_secret: &str, encoded: &str) -> Result<String, CryptoError> {
    let blob = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| CryptoError::Malformed)?;

    if blob.len() < SALT_LEN + NONCE_LEN {
        return Err(CryptoError::Malformed);
    }

    let (salt, rest) = blob.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let mut key = derive_key(master_secret, salt);
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::InvalidKey)?;
    key.zeroize();

    let nonce = Nonce::from_slice(nonce_bytes);
    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::Decrypt)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::Malformed)
}

/// Re-encrypt a blob from `old_secret` to `new_secret` in one step, used by
/// the rekey flow (spec §4.2/§9 Open Question 4). Fails without touching
/// anything if decryption under `old_secret` fails, keeping rekey atomic
/// per value.
pub fn rekey_value(old_secret: &str, new_secret: &str, encoded: &str) -> Result<String, CryptoError> {
    let plaintext = decrypt(old_secret, encoded)?;
    let result = encrypt(new_secret, &plaintext);
    result
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
