// SPDX-License-Identifier: MIT

//! One handler per [`Request`] variant (spec §9 Design Notes: an explicit
//! dispatch table rather than the original's reflection-based `func`
//! lookup), translated from `gluetube/db.py`'s per-table methods plus
//! `autodiscovery.py`'s atomic create/delete.
//!
//! Every handler runs on the daemon's single accept/dispatch task (spec
//! §5 domain a), so no handler needs its own locking beyond what
//! [`DaemonCtx`] already holds.

use gt_core::error::TaggedError;
use gt_core::id::{PipelineId, RunId, ScheduleId};
use gt_protocol::{Request, Response};
use tracing::{error, warn};

use crate::ctx::DaemonCtx;
use crate::error::DaemonError;

/// Dispatch one request to its handler, converting any error into a
/// [`Response::Error`] rather than propagating it — per spec §4.8, every
/// error path logs and the daemon continues serving the next connection.
pub async fn dispatch(request: Request, ctx: &DaemonCtx) -> Response {
    let result = match request {
        Request::Ping => Ok(Response::Pong),
        Request::SetPipeline { name, py_name, dir_name, py_timestamp } => {
            set_pipeline(ctx, name, py_name, dir_name, py_timestamp).await
        }
        Request::DeletePipeline { pipeline_id } => {
            delete_pipeline(ctx, PipelineId::new(pipeline_id)).await
        }
        Request::SetSchedule { pipeline_id, cron, at, paused, retry_on_crash, max_retries } => {
            set_schedule(
                ctx,
                PipelineId::new(pipeline_id),
                cron,
                at,
                paused,
                retry_on_crash,
                max_retries,
            )
            .await
        }
        Request::SetScheduleCron { schedule_id, cron } => {
            set_schedule_cron(ctx, ScheduleId::new(schedule_id), cron).await
        }
        Request::SetScheduleAt { schedule_id, at } => {
            set_schedule_at(ctx, ScheduleId::new(schedule_id), at).await
        }
        Request::SetScheduleNow { schedule_id } => {
            set_schedule_now(ctx, ScheduleId::new(schedule_id)).await
        }
        Request::DeleteSchedule { schedule_id } => {
            delete_schedule(ctx, ScheduleId::new(schedule_id)).await
        }
        Request::SetScheduleLatestRun { schedule_id, run_id } => ctx
            .db
            .set_latest_run(ScheduleId::new(schedule_id), RunId::new(run_id))
            .await
            .map(|()| Response::Ok)
            .map_err(DaemonError::from),
        Request::SetPipelineRun { pipeline_id, schedule_id, start_time } => ctx
            .db
            .insert_run(PipelineId::new(pipeline_id), ScheduleId::new(schedule_id), &start_time)
            .await
            .map(|id| Response::RunId { id: id.get() })
            .map_err(DaemonError::from),
        Request::SetPipelineRunStatus { run_id, status } => ctx
            .db
            .update_run_status(RunId::new(run_id), &status)
            .await
            .map(|()| Response::Ok)
            .map_err(DaemonError::from),
        Request::SetPipelineRunStageAndStageMsg { run_id, stage, stage_msg } => ctx
            .db
            .update_run_stage(RunId::new(run_id), stage, stage_msg.as_deref())
            .await
            .map(|()| Response::Ok)
            .map_err(DaemonError::from),
        Request::SetPipelineRunFinished { run_id, status, exit_msg, end_time } => ctx
            .db
            .finish_run(RunId::new(run_id), &status, exit_msg.as_deref(), &end_time)
            .await
            .map(|()| Response::Ok)
            .map_err(DaemonError::from),
        Request::SetKeyValue { key, value, table } => {
            let master_secret = ctx.master_secret.lock().clone();
            let table = table.unwrap_or_else(|| gt_store::DEFAULT_TABLE.to_string());
            ctx.store
                .set(&master_secret, &table, &key, &value)
                .await
                .map(|()| Response::Ok)
                .map_err(DaemonError::from)
        }
        Request::DeleteKey { key, table } => {
            let table = table.unwrap_or_else(|| gt_store::DEFAULT_TABLE.to_string());
            ctx.store.delete(&table, &key).await.map(|()| Response::Ok).map_err(DaemonError::from)
        }
        Request::RekeyDb { new_secret } => rekey_db(ctx, new_secret).await,
    };

    result.unwrap_or_else(|err| {
        error!(error = %err, "rpc handler failed");
        Response::error(err.kind().to_string(), err.to_string())
    })
}

async fn set_pipeline(
    ctx: &DaemonCtx,
    name: String,
    py_name: String,
    dir_name: String,
    py_timestamp: f64,
) -> Result<Response, DaemonError> {
    let pipeline_id = ctx.db.insert_pipeline(&name, &py_name, &dir_name, py_timestamp).await?;

    // A newly discovered pipeline always starts with one parked schedule
    // (spec §4.7). If installing its scheduler entry fails, the pipeline
    // row is rolled back so a later scan sees the file as missing again.
    let schedule_id = match ctx
        .db
        .insert_schedule(pipeline_id, "", "", false, ctx.default_retry_on_crash, ctx.default_max_retries)
        .await
    {
        Ok(id) => id,
        Err(err) => {
            if let Err(rollback_err) = ctx.db.delete_pipeline(pipeline_id).await {
                warn!(error = %rollback_err, "failed to roll back pipeline after schedule insert failure");
            }
            return Err(err.into());
        }
    };

    if let Err(err) = ctx.scheduler.set(schedule_id, pipeline_id, "", "", false) {
        if let Err(rollback_err) = ctx.db.delete_pipeline(pipeline_id).await {
            warn!(error = %rollback_err, "failed to roll back pipeline after scheduler install failure");
        }
        return Err(err.into());
    }

    Ok(Response::PipelineId { id: pipeline_id.get() })
}

async fn delete_pipeline(ctx: &DaemonCtx, pipeline_id: PipelineId) -> Result<Response, DaemonError> {
    let schedule_ids = ctx.db.pipeline_schedules_id(pipeline_id).await?;
    for schedule_id in schedule_ids {
        ctx.scheduler.remove(schedule_id);
    }
    ctx.db.delete_pipeline(pipeline_id).await?;
    Ok(Response::Ok)
}

async fn set_schedule(
    ctx: &DaemonCtx,
    pipeline_id: PipelineId,
    cron: String,
    at: String,
    paused: bool,
    retry_on_crash: bool,
    max_retries: i64,
) -> Result<Response, DaemonError> {
    let schedule_id =
        ctx.db.insert_schedule(pipeline_id, &cron, &at, paused, retry_on_crash, max_retries).await?;

    if let Err(err) = ctx.scheduler.set(schedule_id, pipeline_id, &cron, &at, paused) {
        if let Err(rollback_err) = ctx.db.delete_schedule(schedule_id).await {
            warn!(error = %rollback_err, "failed to roll back schedule after scheduler install failure");
        }
        return Err(err.into());
    }

    Ok(Response::ScheduleId { id: schedule_id.get() })
}

async fn set_schedule_cron(
    ctx: &DaemonCtx,
    schedule_id: ScheduleId,
    cron: String,
) -> Result<Response, DaemonError> {
    let pipeline = ctx.db.pipeline_from_schedule_id(schedule_id).await?;
    ctx.db.update_cron(schedule_id, &cron).await?;
    let schedule = ctx.db.pipeline_schedule(pipeline.id, schedule_id).await?;
    ctx.scheduler.set(schedule_id, pipeline.id, &cron, "", schedule.paused)?;
    Ok(Response::Ok)
}

async fn set_schedule_at(
    ctx: &DaemonCtx,
    schedule_id: ScheduleId,
    at: String,
) -> Result<Response, DaemonError> {
    let pipeline = ctx.db.pipeline_from_schedule_id(schedule_id).await?;
    ctx.db.update_at(schedule_id, &at).await?;
    let schedule = ctx.db.pipeline_schedule(pipeline.id, schedule_id).await?;
    ctx.scheduler.set(schedule_id, pipeline.id, "", &at, schedule.paused)?;
    Ok(Response::Ok)
}

async fn set_schedule_now(ctx: &DaemonCtx, schedule_id: ScheduleId) -> Result<Response, DaemonError> {
    let pipeline = ctx.db.pipeline_from_schedule_id(schedule_id).await?;
    let schedule = ctx.db.pipeline_schedule(pipeline.id, schedule_id).await?;
    ctx.db.park(schedule_id).await?;
    // Clearing cron/at alone would leave the trigger parked, which `due()`
    // never fires; install a one-shot `at` trigger at the current instant
    // instead, so the next tick fires it once and the registry parks it for
    // us (`Registry::due` auto-parks a fired `at` trigger). This does not
    // implicitly unpause, so carry the existing `paused` bit over.
    let now = ctx.scheduler.now();
    ctx.scheduler.set(schedule_id, pipeline.id, "", &now.to_rfc3339(), schedule.paused)?;
    Ok(Response::Ok)
}

async fn delete_schedule(ctx: &DaemonCtx, schedule_id: ScheduleId) -> Result<Response, DaemonError> {
    ctx.scheduler.remove(schedule_id);
    ctx.db.delete_schedule(schedule_id).await?;
    Ok(Response::Ok)
}

async fn rekey_db(ctx: &DaemonCtx, new_secret: String) -> Result<Response, DaemonError> {
    let old_secret = ctx.master_secret.lock().clone();
    ctx.store.rekey(&old_secret, &new_secret, gt_store::DEFAULT_TABLE).await?;
    ctx.config.lock().write_back_sqlite_token(&new_secret)?;
    *ctx.master_secret.lock() = new_secret;
    Ok(Response::Ok)
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
