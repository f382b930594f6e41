// SPDX-License-Identifier: MIT

//! Schema for the `pipeline`, `pipeline_schedule`, and `pipeline_run`
//! tables (spec §3/§4.3), translated from `gluetube/db.py::Pipeline.create_schema`.

use sqlx::SqlitePool;

use crate::error::DbError;

pub(crate) async fn migrate(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipeline (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE CHECK(name <> ''),
            py_name TEXT NOT NULL CHECK(py_name <> ''),
            dir_name TEXT NOT NULL CHECK(dir_name <> ''),
            py_timestamp REAL NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(DbError::Migration)?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipeline_schedule (
            id INTEGER PRIMARY KEY,
            pipeline_id INTEGER NOT NULL,
            cron TEXT NOT NULL DEFAULT '',
            at TEXT NOT NULL DEFAULT '',
            paused INTEGER NOT NULL DEFAULT 0,
            retry_on_crash INTEGER NOT NULL DEFAULT 0,
            retry_num INTEGER NOT NULL DEFAULT 0,
            max_retries INTEGER NOT NULL DEFAULT 0,
            latest_run INTEGER,
            CHECK (NOT (cron <> '' AND at <> '')),
            CONSTRAINT fk_schedule_pipeline
                FOREIGN KEY (pipeline_id) REFERENCES pipeline(id) ON DELETE CASCADE,
            CONSTRAINT fk_schedule_latest_run
                FOREIGN KEY (latest_run) REFERENCES pipeline_run(id) ON DELETE SET NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(DbError::Migration)?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipeline_run (
            id INTEGER PRIMARY KEY,
            pipeline_id INTEGER NOT NULL,
            schedule_id INTEGER NOT NULL,
            status TEXT NOT NULL CHECK(status <> ''),
            stage INTEGER NOT NULL DEFAULT 0,
            stage_msg TEXT,
            exit_msg TEXT,
            start_time TEXT NOT NULL CHECK(start_time <> ''),
            end_time TEXT,
            CONSTRAINT fk_run_pipeline
                FOREIGN KEY (pipeline_id) REFERENCES pipeline(id) ON DELETE CASCADE,
            CONSTRAINT fk_run_schedule
                FOREIGN KEY (schedule_id) REFERENCES pipeline_schedule(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(DbError::Migration)?;

    for index in [
        "CREATE INDEX IF NOT EXISTS pipeline_run_pipeline_id_index ON pipeline_run (pipeline_id)",
        "CREATE INDEX IF NOT EXISTS pipeline_run_schedule_id_index ON pipeline_run (schedule_id)",
        "CREATE INDEX IF NOT EXISTS pipeline_run_start_time_index ON pipeline_run (start_time)",
        "CREATE INDEX IF NOT EXISTS pipeline_schedule_pipeline_id_index ON pipeline_schedule (pipeline_id)",
    ] {
        sqlx::query(index)
            .execute(pool)
            .await
            .map_err(DbError::Migration)?;
    }

    Ok(())
}
