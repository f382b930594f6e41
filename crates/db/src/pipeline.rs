// SPDX-License-Identifier: MIT

//! Queries against the `pipeline` table and the joins that read it
//! alongside `pipeline_schedule`/`pipeline_run`, translated from
//! `gluetube/db.py::Pipeline`.

use gt_core::id::{PipelineId, ScheduleId};
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Pipeline, PipelineScheduling, PipelineSummary};
use crate::Db;

impl Db {
    /// Insert a new pipeline row. Fails with
    /// [`DbError::DuplicatePipelineName`] if `name` is already taken (spec
    /// §3/§8).
    pub async fn insert_pipeline(
        &self,
        name: &str,
        py_name: &str,
        dir_name: &str,
        py_timestamp: f64,
    ) -> Result<PipelineId, DbError> {
        let row = sqlx::query(
            "INSERT INTO pipeline (name, py_name, dir_name, py_timestamp) \
             VALUES (?1, ?2, ?3, ?4) RETURNING id",
        )
        .bind(name)
        .bind(py_name)
        .bind(dir_name)
        .bind(py_timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| DbError::from_insert_pipeline(err, name))?;

        let id: i64 = row.try_get("id").map_err(DbError::Backend)?;
        Ok(PipelineId::new(id))
    }

    /// Delete a pipeline and, via `ON DELETE CASCADE`, every schedule and
    /// run that belongs to it (spec §3's cascade-delete invariant).
    pub async fn delete_pipeline(&self, id: PipelineId) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM pipeline WHERE id = ?1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(DbError::Backend)?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("pipeline {id}")));
        }
        Ok(())
    }

    /// Look up a pipeline by its unique name.
    pub async fn pipeline_by_name(&self, name: &str) -> Result<Option<Pipeline>, DbError> {
        let row = sqlx::query(
            "SELECT id, name, py_name, dir_name, py_timestamp FROM pipeline WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::Backend)?;

        row.map(pipeline_from_row).transpose()
    }

    /// Look up a pipeline by id.
    pub async fn pipeline_by_id(&self, id: PipelineId) -> Result<Option<Pipeline>, DbError> {
        let row =
            sqlx::query("SELECT id, name, py_name, dir_name, py_timestamp FROM pipeline WHERE id = ?1")
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(DbError::Backend)?;

        row.map(pipeline_from_row).transpose()
    }

    /// The pipeline that owns a given schedule (spec §4.3's
    /// `pipeline_from_schedule_id`).
    pub async fn pipeline_from_schedule_id(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Pipeline, DbError> {
        let row = sqlx::query(
            "SELECT p.id, p.name, p.py_name, p.dir_name, p.py_timestamp \
             FROM pipeline p \
             JOIN pipeline_schedule s ON s.pipeline_id = p.id \
             WHERE s.id = ?1",
        )
        .bind(schedule_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::Backend)?
        .ok_or_else(|| DbError::NotFound(format!("schedule {schedule_id}")))?;

        pipeline_from_row(row)
    }

    /// All pipelines, left-joined to their (usually singular) schedule
    /// (spec §4.3's `all_pipelines_scheduling`). Used by the scheduler at
    /// startup to rebuild its in-memory job registry.
    pub async fn all_pipelines_scheduling(&self) -> Result<Vec<PipelineScheduling>, DbError> {
        let rows = sqlx::query(
            "SELECT p.id AS pipeline_id, p.name, p.py_name, p.dir_name, \
                    s.id AS schedule_id, s.cron, s.at, s.paused \
             FROM pipeline p \
             LEFT JOIN pipeline_schedule s ON s.pipeline_id = p.id \
             ORDER BY p.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::Backend)?;

        rows.into_iter()
            .map(|row| {
                let schedule_id: Option<i64> =
                    row.try_get("schedule_id").map_err(DbError::Backend)?;
                Ok(PipelineScheduling {
                    pipeline_id: PipelineId::new(row.try_get("pipeline_id").map_err(DbError::Backend)?),
                    name: row.try_get("name").map_err(DbError::Backend)?,
                    py_name: row.try_get("py_name").map_err(DbError::Backend)?,
                    dir_name: row.try_get("dir_name").map_err(DbError::Backend)?,
                    schedule_id: schedule_id.map(ScheduleId::new),
                    cron: row.try_get("cron").map_err(DbError::Backend)?,
                    at: row.try_get("at").map_err(DbError::Backend)?,
                    paused: row.try_get::<i64, _>("paused").map_err(DbError::Backend)? != 0,
                })
            })
            .collect()
    }

    /// The CLI's tabular summary read (spec §4.3's `summary_pipelines`):
    /// every pipeline with its schedule and latest run, one row each.
    pub async fn summary_pipelines(&self) -> Result<Vec<PipelineSummary>, DbError> {
        let rows = sqlx::query(
            "SELECT p.name, p.py_name, s.id AS schedule_id, s.cron, s.at, s.paused, \
                    r.status AS latest_run_status, r.stage_msg AS latest_run_stage_msg, \
                    r.end_time AS latest_run_end_time \
             FROM pipeline p \
             LEFT JOIN pipeline_schedule s ON s.pipeline_id = p.id \
             LEFT JOIN pipeline_run r ON r.id = s.latest_run \
             ORDER BY p.name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::Backend)?;

        rows.into_iter()
            .map(|row| {
                let schedule_id: Option<i64> =
                    row.try_get("schedule_id").map_err(DbError::Backend)?;
                Ok(PipelineSummary {
                    name: row.try_get("name").map_err(DbError::Backend)?,
                    py_name: row.try_get("py_name").map_err(DbError::Backend)?,
                    schedule_id: schedule_id.map(ScheduleId::new),
                    cron: row.try_get("cron").map_err(DbError::Backend)?,
                    at: row.try_get("at").map_err(DbError::Backend)?,
                    paused: row.try_get::<i64, _>("paused").map_err(DbError::Backend)? != 0,
                    latest_run_status: row.try_get("latest_run_status").map_err(DbError::Backend)?,
                    latest_run_stage_msg: row
                        .try_get("latest_run_stage_msg")
                        .map_err(DbError::Backend)?,
                    latest_run_end_time: row
                        .try_get("latest_run_end_time")
                        .map_err(DbError::Backend)?,
                })
            })
            .collect()
    }
}

fn pipeline_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Pipeline, DbError> {
    Ok(Pipeline {
        id: PipelineId::new(row.try_get("id").map_err(DbError::Backend)?),
        name: row.try_get("name").map_err(DbError::Backend)?,
        py_name: row.try_get("py_name").map_err(DbError::Backend)?,
        dir_name: row.try_get("dir_name").map_err(DbError::Backend)?,
        py_timestamp: row.try_get("py_timestamp").map_err(DbError::Backend)?,
    })
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
