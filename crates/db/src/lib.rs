// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The pipelines database (spec §3/§4.3): pipelines, their schedules, and
//! their run history, backed by a single SQLite file. The daemon holds the
//! sole writable handle; everything else (the CLI, ad hoc tooling) opens a
//! read-only connection.

mod error;
mod models;
mod pipeline;
mod pool;
mod run;
mod schedule;
mod schema;

use std::path::Path;

use sqlx::SqlitePool;

pub use error::DbError;
pub use models::{Pipeline, PipelineScheduling, PipelineSummary, Run, Schedule};

/// A handle to the pipelines database. Cheap to clone: it wraps a
/// [`sqlx::SqlitePool`], which is itself reference-counted.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open the writable handle, creating the file and running migrations
    /// if it does not exist yet.
    pub async fn open_writable(path: &Path) -> Result<Self, DbError> {
        let pool = pool::open_writable(path).await?;
        Ok(Self { pool })
    }

    /// Open a read-only handle against an existing database file.
    pub async fn open_read_only(path: &Path) -> Result<Self, DbError> {
        let pool = pool::open_read_only(path).await?;
        Ok(Self { pool })
    }

    /// Open an in-memory database. Test-only.
    pub async fn open_in_memory() -> Result<Self, DbError> {
        let pool = pool::open_in_memory().await?;
        Ok(Self { pool })
    }
}

#[cfg(test)]
mod pool_tests {
    use super::Db;

    #[tokio::test]
    async fn in_memory_db_migrates_on_open() {
        let db = Db::open_in_memory().await.expect("open in-memory db");
        let pipelines = db.summary_pipelines().await.expect("query fresh db");
        assert!(pipelines.is_empty());
    }
}
