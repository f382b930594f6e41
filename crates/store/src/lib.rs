// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The encrypted key-value store (spec §4.2), backed by one or more
//! `(key, value)` tables in its own SQLite file — `common` always exists
//! (created on open), and callers may `create_table` more. Values are
//! encrypted at rest with [`gt_crypto`]; the master secret is supplied by
//! the caller on every call and never persisted.

mod error;
mod pool;

use std::path::Path;

use sqlx::{Row, SqlitePool};

pub use error::StoreError;

/// The table spec §6's RPC methods fall back to when no table is named.
pub const DEFAULT_TABLE: &str = "common";

/// Table names are interpolated directly into SQL (sqlx has no way to bind
/// an identifier), so every caller-supplied name is checked against this
/// allowlist first: ASCII alphanumeric or underscore, not starting with a
/// digit. Rejects anything that could break out of the identifier position.
fn validate_table_name(table: &str) -> Result<(), StoreError> {
    let mut chars = table.chars();
    let starts_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::InvalidTableName(table.to_string()));
    }
    Ok(())
}

/// A handle to the encrypted key-value store.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn open_writable(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            pool: pool::open_writable(path).await?,
        })
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            pool: pool::open_in_memory().await?,
        })
    }

    /// Create a `(key, value)` table if it doesn't already exist (spec
    /// §4.2's `create_table`).
    pub async fn create_table(&self, table: &str) -> Result<(), StoreError> {
        validate_table_name(table)?;
        let query = format!("CREATE TABLE IF NOT EXISTS {table} (key TEXT PRIMARY KEY, value TEXT NOT NULL)");
        sqlx::query(&query).execute(&self.pool).await?;
        Ok(())
    }

    /// Set a key's value, creating or replacing the row (spec §4.2's
    /// `insert_or_replace`). Rejects an empty key or an empty plaintext
    /// value.
    pub async fn set(
        &self,
        master_secret: &str,
        table: &str,
        key: &str,
        plaintext: &str,
    ) -> Result<(), StoreError> {
        validate_table_name(table)?;
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        let encrypted = gt_crypto::encrypt(master_secret, plaintext)?;
        let query = format!(
            "INSERT INTO {table} (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = excluded.value"
        );
        sqlx::query(&query).bind(key).bind(encrypted).execute(&self.pool).await?;
        Ok(())
    }

    /// Fetch and decrypt a single value, or `None` if the key is absent
    /// (spec §4.2's `value`, which distinguishes not-found from an empty
    /// string).
    pub async fn get(&self, master_secret: &str, table: &str, key: &str) -> Result<Option<String>, StoreError> {
        validate_table_name(table)?;
        let query = format!("SELECT value FROM {table} WHERE key = ?1");
        let row = sqlx::query(&query).bind(key).fetch_optional(&self.pool).await?;

        match row {
            Some(row) => {
                let encrypted: String = row.try_get("value").map_err(StoreError::Backend)?;
                Ok(Some(gt_crypto::decrypt(master_secret, &encrypted)?))
            }
            None => Ok(None),
        }
    }

    /// Delete a key. Deleting an absent key is not an error (spec §4.2).
    pub async fn delete(&self, table: &str, key: &str) -> Result<(), StoreError> {
        validate_table_name(table)?;
        let query = format!("DELETE FROM {table} WHERE key = ?1");
        sqlx::query(&query).bind(key).execute(&self.pool).await?;
        Ok(())
    }

    /// All keys currently stored, in no particular order.
    pub async fn all_keys(&self, table: &str) -> Result<Vec<String>, StoreError> {
        validate_table_name(table)?;
        let query = format!("SELECT key FROM {table}");
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| row.try_get("key").map_err(StoreError::Backend))
            .collect()
    }

    /// Every key decrypted alongside its value (spec §4.2's
    /// `all_key_values`), used by variable templating (spec §4.6) and the
    /// rekey flow.
    pub async fn all_key_values(&self, master_secret: &str, table: &str) -> Result<Vec<(String, String)>, StoreError> {
        validate_table_name(table)?;
        let query = format!("SELECT key, value FROM {table}");
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| {
                let key: String = row.try_get("key").map_err(StoreError::Backend)?;
                let encrypted: String = row.try_get("value").map_err(StoreError::Backend)?;
                let plaintext = gt_crypto::decrypt(master_secret, &encrypted)?;
                Ok((key, plaintext))
            })
            .collect()
    }

    /// Re-encrypt every value in `table` under `new_secret` (spec §4.2/§9
    /// Open Question decision). Decrypts everything under `old_secret`
    /// first and only writes back once every value has decrypted
    /// successfully, so a wrong `old_secret` leaves the store untouched
    /// rather than half rekeyed. The daemon only ever calls this against
    /// [`DEFAULT_TABLE`], since that's the only table the master secret
    /// operationally protects; a caller-created table would need its own
    /// rekey call with its own name.
    pub async fn rekey(&self, old_secret: &str, new_secret: &str, table: &str) -> Result<(), StoreError> {
        validate_table_name(table)?;
        let select = format!("SELECT key, value FROM {table}");
        let rows = sqlx::query(&select).fetch_all(&self.pool).await?;

        let mut reencrypted = Vec::with_capacity(rows.len());
        for row in rows {
            let key: String = row.try_get("key").map_err(StoreError::Backend)?;
            let old_value: String = row.try_get("value").map_err(StoreError::Backend)?;
            let new_value = gt_crypto::rekey_value(old_secret, new_secret, &old_value)?;
            reencrypted.push((key, new_value));
        }

        let update = format!("UPDATE {table} SET value = ?1 WHERE key = ?2");
        let mut tx = self.pool.begin().await?;
        for (key, value) in reencrypted {
            sqlx::query(&update).bind(value).bind(key).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
