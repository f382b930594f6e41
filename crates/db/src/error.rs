// SPDX-License-Identifier: MIT

use thiserror::Error;

use gt_core::error::{ErrorKind, TaggedError};

/// `dbError` from spec §7. SQLite constraint failures (unique pipeline
/// names, the cron/at check constraint) are distinguished from generic
/// backend errors so handlers can decide whether a compound mutation needs
/// to roll back its scheduler-side effect (spec §4.8/§7).
#[derive(Debug, Error)]
pub enum DbError {
    #[error("a pipeline named {0:?} already exists")]
    DuplicatePipelineName(String),

    #[error("a schedule cannot have both cron and at set")]
    BothCronAndAtSet,

    #[error("no row found for {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Backend(#[source] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[source] sqlx::Error),
}

impl DbError {
    /// Classify a raw backend error, filling in `name` if it turns out to be
    /// a duplicate-pipeline-name violation. Call sites that know which name
    /// they just tried to insert should use this instead of the bare `From`
    /// impl so the error carries the name, not just the SQLite message.
    pub(crate) fn from_insert_pipeline(err: sqlx::Error, name: &str) -> Self {
        if is_unique_name_violation(&err) {
            return DbError::DuplicatePipelineName(name.to_string());
        }
        if is_check_violation(&err) {
            return DbError::BothCronAndAtSet;
        }
        DbError::Backend(err)
    }
}

fn is_unique_name_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE constraint failed: pipeline.name"))
}

fn is_check_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.message().contains("CHECK constraint failed"))
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if is_check_violation(&err) {
            return DbError::BothCronAndAtSet;
        }
        DbError::Backend(err)
    }
}

impl TaggedError for DbError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Db
    }
}
