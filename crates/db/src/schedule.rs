// SPDX-License-Identifier: MIT

//! Queries against `pipeline_schedule`, translated from
//! `gluetube/db.py::PipelineSchedule`.

use gt_core::id::{PipelineId, RunId, ScheduleId};
use sqlx::Row;

use crate::error::DbError;
use crate::models::Schedule;
use crate::Db;

impl Db {
    /// Insert a schedule row. At most one of `cron`/`at` may be non-empty
    /// (spec §3); passing both rejects with [`DbError::BothCronAndAtSet`]
    /// via the table's `CHECK` constraint.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_schedule(
        &self,
        pipeline_id: PipelineId,
        cron: &str,
        at: &str,
        paused: bool,
        retry_on_crash: bool,
        max_retries: i64,
    ) -> Result<ScheduleId, DbError> {
        let row = sqlx::query(
            "INSERT INTO pipeline_schedule \
                (pipeline_id, cron, at, paused, retry_on_crash, retry_num, max_retries) \
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6) RETURNING id",
        )
        .bind(pipeline_id.get())
        .bind(cron)
        .bind(at)
        .bind(paused)
        .bind(retry_on_crash)
        .bind(max_retries)
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = row.try_get("id").map_err(DbError::Backend)?;
        Ok(ScheduleId::new(id))
    }

    /// Delete a schedule and, via cascade, its runs (spec §3).
    pub async fn delete_schedule(&self, id: ScheduleId) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM pipeline_schedule WHERE id = ?1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(DbError::Backend)?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("schedule {id}")));
        }
        Ok(())
    }

    /// Fetch one schedule by its id, scoped to the pipeline it claims to
    /// belong to (spec §4.3's `pipeline_schedule(pid, sid)`).
    pub async fn pipeline_schedule(
        &self,
        pipeline_id: PipelineId,
        schedule_id: ScheduleId,
    ) -> Result<Schedule, DbError> {
        let row = sqlx::query(
            "SELECT id, pipeline_id, cron, at, paused, retry_on_crash, retry_num, \
                    max_retries, latest_run \
             FROM pipeline_schedule WHERE id = ?1 AND pipeline_id = ?2",
        )
        .bind(schedule_id.get())
        .bind(pipeline_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::Backend)?
        .ok_or_else(|| DbError::NotFound(format!("schedule {schedule_id}")))?;

        schedule_from_row(row)
    }

    /// All schedule ids belonging to a pipeline (spec §4.3's
    /// `pipeline_schedules_id`).
    pub async fn pipeline_schedules_id(
        &self,
        pipeline_id: PipelineId,
    ) -> Result<Vec<ScheduleId>, DbError> {
        let rows = sqlx::query("SELECT id FROM pipeline_schedule WHERE pipeline_id = ?1")
            .bind(pipeline_id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::Backend)?;

        rows.into_iter()
            .map(|row| Ok(ScheduleId::new(row.try_get("id").map_err(DbError::Backend)?)))
            .collect()
    }

    /// Replace the cron expression and clear `at` (spec §9 decision: cron
    /// and at are mutually exclusive, so setting one clears the other).
    pub async fn update_cron(&self, id: ScheduleId, cron: &str) -> Result<(), DbError> {
        sqlx::query("UPDATE pipeline_schedule SET cron = ?1, at = '' WHERE id = ?2")
            .bind(cron)
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Replace the one-shot `at` timestamp and clear `cron`.
    pub async fn update_at(&self, id: ScheduleId, at: &str) -> Result<(), DbError> {
        sqlx::query("UPDATE pipeline_schedule SET at = ?1, cron = '' WHERE id = ?2")
            .bind(at)
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Park a schedule: clear both `cron` and `at` (spec §3's "parked"
    /// state, used by `set_schedule_now` per the spec §9 decision that it
    /// does not implicitly unpause).
    pub async fn park(&self, id: ScheduleId) -> Result<(), DbError> {
        sqlx::query("UPDATE pipeline_schedule SET cron = '', at = '' WHERE id = ?1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(DbError::Backend)?;
        Ok(())
    }

    pub async fn update_paused(&self, id: ScheduleId, paused: bool) -> Result<(), DbError> {
        sqlx::query("UPDATE pipeline_schedule SET paused = ?1 WHERE id = ?2")
            .bind(paused)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(DbError::Backend)?;
        Ok(())
    }

    pub async fn update_retry_on_crash(
        &self,
        id: ScheduleId,
        retry_on_crash: bool,
    ) -> Result<(), DbError> {
        sqlx::query("UPDATE pipeline_schedule SET retry_on_crash = ?1 WHERE id = ?2")
            .bind(retry_on_crash)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(DbError::Backend)?;
        Ok(())
    }

    pub async fn update_max_retries(&self, id: ScheduleId, max_retries: i64) -> Result<(), DbError> {
        sqlx::query("UPDATE pipeline_schedule SET max_retries = ?1 WHERE id = ?2")
            .bind(max_retries)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(DbError::Backend)?;
        Ok(())
    }

    /// Increment or reset the crash-retry counter. Passing `0` resets it,
    /// used once a run finally succeeds.
    pub async fn set_retry_num(&self, id: ScheduleId, retry_num: i64) -> Result<(), DbError> {
        sqlx::query("UPDATE pipeline_schedule SET retry_num = ?1 WHERE id = ?2")
            .bind(retry_num)
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(DbError::Backend)?;
        Ok(())
    }

    /// Point `latest_run` at a freshly inserted run (spec §4.3's
    /// `set_schedule_latest_run`).
    pub async fn set_latest_run(&self, id: ScheduleId, run_id: RunId) -> Result<(), DbError> {
        sqlx::query("UPDATE pipeline_schedule SET latest_run = ?1 WHERE id = ?2")
            .bind(run_id.get())
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(DbError::Backend)?;
        Ok(())
    }
}

fn schedule_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Schedule, DbError> {
    let latest_run: Option<i64> = row.try_get("latest_run").map_err(DbError::Backend)?;
    Ok(Schedule {
        id: ScheduleId::new(row.try_get("id").map_err(DbError::Backend)?),
        pipeline_id: PipelineId::new(row.try_get("pipeline_id").map_err(DbError::Backend)?),
        cron: row.try_get("cron").map_err(DbError::Backend)?,
        at: row.try_get("at").map_err(DbError::Backend)?,
        paused: row.try_get::<i64, _>("paused").map_err(DbError::Backend)? != 0,
        retry_on_crash: row.try_get::<i64, _>("retry_on_crash").map_err(DbError::Backend)? != 0,
        retry_num: row.try_get("retry_num").map_err(DbError::Backend)?,
        max_retries: row.try_get("max_retries").map_err(DbError::Backend)?,
        latest_run: latest_run.map(RunId::new),
    })
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
