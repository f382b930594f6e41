// SPDX-License-Identifier: MIT

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::DbError;

/// Open the writable pool used by the daemon (the sole writer per spec
/// §4.3/§5): write-ahead journaling, foreign keys on, schema migrated.
pub async fn open_writable(path: &Path) -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(DbError::Backend)?;

    crate::schema::migrate(&pool).await?;
    Ok(pool)
}

/// Open a read-only pool, for the CLI and any other reader that should
/// never mutate the database (spec §5: "pipelines and CLIs open read-only
/// handles").
pub async fn open_read_only(path: &Path) -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .map_err(DbError::Backend)
}

/// Open an in-memory database, for tests only.
pub async fn open_in_memory() -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(DbError::Backend)?;

    crate::schema::migrate(&pool).await?;
    Ok(pool)
}
