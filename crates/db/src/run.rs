// SPDX-License-Identifier: MIT

//! Queries against `pipeline_run`, translated from
//! `gluetube/db.py::PipelineRun`.

use gt_core::id::{PipelineId, RunId, ScheduleId};
use sqlx::Row;

use crate::error::DbError;
use crate::models::Run;
use crate::Db;

impl Db {
    /// Insert a new run in the `running` status (spec §4.3/§4.5: a run is
    /// created the instant a job starts executing, before its exit is
    /// known).
    pub async fn insert_run(
        &self,
        pipeline_id: PipelineId,
        schedule_id: ScheduleId,
        start_time: &str,
    ) -> Result<RunId, DbError> {
        let row = sqlx::query(
            "INSERT INTO pipeline_run (pipeline_id, schedule_id, status, stage, start_time) \
             VALUES (?1, ?2, 'running', 0, ?3) RETURNING id",
        )
        .bind(pipeline_id.get())
        .bind(schedule_id.get())
        .bind(start_time)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::Backend)?;

        let id: i64 = row.try_get("id").map_err(DbError::Backend)?;
        Ok(RunId::new(id))
    }

    pub async fn run_by_id(&self, id: RunId) -> Result<Run, DbError> {
        let row = sqlx::query(
            "SELECT id, pipeline_id, schedule_id, status, stage, stage_msg, exit_msg, \
                    start_time, end_time \
             FROM pipeline_run WHERE id = ?1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::Backend)?
        .ok_or_else(|| DbError::NotFound(format!("run {id}")))?;

        run_from_row(row)
    }

    /// Update a run's status (spec §4.3's `set_pipeline_run_status`):
    /// `running`, `success`, `failed`, or `crashed`.
    pub async fn update_run_status(&self, id: RunId, status: &str) -> Result<(), DbError> {
        sqlx::query("UPDATE pipeline_run SET status = ?1 WHERE id = ?2")
            .bind(status)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(DbError::Backend)?;
        Ok(())
    }

    /// Record progress (spec §4.3's
    /// `set_pipeline_run_stage_and_stage_msg`), the equivalent of the
    /// `stage_report` decorator's per-stage callback.
    pub async fn update_run_stage(
        &self,
        id: RunId,
        stage: i64,
        stage_msg: Option<&str>,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE pipeline_run SET stage = ?1, stage_msg = ?2 WHERE id = ?3")
            .bind(stage)
            .bind(stage_msg)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(DbError::Backend)?;
        Ok(())
    }

    /// Finalize a run (spec §4.3's `set_pipeline_run_finished`): final
    /// status, an optional exit message, and the end timestamp, all in one
    /// update so a reader never observes a run with an `end_time` but no
    /// terminal status.
    pub async fn finish_run(
        &self,
        id: RunId,
        status: &str,
        exit_msg: Option<&str>,
        end_time: &str,
    ) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE pipeline_run SET status = ?1, exit_msg = ?2, end_time = ?3 WHERE id = ?4",
        )
        .bind(status)
        .bind(exit_msg)
        .bind(end_time)
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(DbError::Backend)?;
        Ok(())
    }

    /// The most recent runs for a schedule, newest first, for the CLI's
    /// history view.
    pub async fn recent_runs(
        &self,
        schedule_id: ScheduleId,
        limit: i64,
    ) -> Result<Vec<Run>, DbError> {
        let rows = sqlx::query(
            "SELECT id, pipeline_id, schedule_id, status, stage, stage_msg, exit_msg, \
                    start_time, end_time \
             FROM pipeline_run WHERE schedule_id = ?1 ORDER BY start_time DESC LIMIT ?2",
        )
        .bind(schedule_id.get())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::Backend)?;

        rows.into_iter().map(run_from_row).collect()
    }
}

fn run_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Run, DbError> {
    Ok(Run {
        id: RunId::new(row.try_get("id").map_err(DbError::Backend)?),
        pipeline_id: PipelineId::new(row.try_get("pipeline_id").map_err(DbError::Backend)?),
        schedule_id: ScheduleId::new(row.try_get("schedule_id").map_err(DbError::Backend)?),
        status: row.try_get("status").map_err(DbError::Backend)?,
        stage: row.try_get("stage").map_err(DbError::Backend)?,
        stage_msg: row.try_get("stage_msg").map_err(DbError::Backend)?,
        exit_msg: row.try_get("exit_msg").map_err(DbError::Backend)?,
        start_time: row.try_get("start_time").map_err(DbError::Backend)?,
        end_time: row.try_get("end_time").map_err(DbError::Backend)?,
    })
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
