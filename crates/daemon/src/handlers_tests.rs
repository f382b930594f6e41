use super::*;
use gt_core::SystemClock;
use gt_db::Db;
use gt_store::Store;
use std::sync::Arc;
use tempfile::tempdir;

async fn test_ctx() -> DaemonCtx {
    let dir = tempdir().expect("tempdir");
    DaemonCtx {
        db: Db::open_in_memory().await.expect("open db"),
        store: Store::open_in_memory().await.expect("open store"),
        scheduler: gt_scheduler::Scheduler::new(SystemClock),
        socket_file: dir.path().join("gluetube.sock"),
        pipeline_dir: dir.path().to_path_buf(),
        master_secret: Arc::new(parking_lot::Mutex::new("secret".to_string())),
        config: Arc::new(parking_lot::Mutex::new(test_config(&dir))),
        default_retry_on_crash: false,
        default_max_retries: 0,
    }
}

fn test_config(dir: &tempfile::TempDir) -> gt_config::Config {
    let config_path = dir.path().join("gluetube.conf");
    std::fs::write(
        &config_path,
        r#"
        PIPELINE_DIR = "/tmp"
        PIPELINE_SCAN_INTERVAL = "60"
        SQLITE_DIR = "/tmp"
        SQLITE_APP_NAME = "gluetube.db"
        SQLITE_KV_NAME = "gluetube_kv.db"
        SQLITE_TOKEN = "secret"
        SOCKET_FILE = "/tmp/gluetube.sock"
        PID_FILE = "/tmp/gluetube.pid"
        GLUETUBE_LOG_FILE = "/tmp/gluetube.log"
        "#,
    )
    .expect("write config");
    gt_config::Config::load(&[config_path]).expect("load config")
}

#[tokio::test]
async fn set_pipeline_creates_a_pipeline_and_a_parked_schedule() {
    let ctx = test_ctx().await;

    let response = dispatch(
        Request::SetPipeline {
            name: "amber-river".to_string(),
            py_name: "p.py".to_string(),
            dir_name: "alpha".to_string(),
            py_timestamp: 0.0,
        },
        &ctx,
    )
    .await;

    let Response::PipelineId { id } = response else {
        panic!("expected PipelineId response, got {response:?}");
    };
    let pipeline = ctx.db.pipeline_by_id(PipelineId::new(id)).await.expect("query pipeline");
    assert_eq!(pipeline.name, "amber-river");

    let scheduling = ctx.db.all_pipelines_scheduling().await.expect("query scheduling");
    assert_eq!(scheduling.len(), 1);
    assert!(scheduling[0].schedule_id.is_some());
    assert_eq!(ctx.scheduler.len(), 1);
}

#[tokio::test]
async fn delete_pipeline_removes_the_scheduler_entry_and_the_row() {
    let ctx = test_ctx().await;
    let create = dispatch(
        Request::SetPipeline {
            name: "amber-river".to_string(),
            py_name: "p.py".to_string(),
            dir_name: "alpha".to_string(),
            py_timestamp: 0.0,
        },
        &ctx,
    )
    .await;
    let Response::PipelineId { id } = create else { panic!("setup failed") };

    let response = dispatch(Request::DeletePipeline { pipeline_id: id }, &ctx).await;
    assert_eq!(response, Response::Ok);
    assert_eq!(ctx.scheduler.len(), 0);
    assert!(ctx.db.pipeline_by_id(PipelineId::new(id)).await.expect("query").is_none()
        || matches!(ctx.db.pipeline_by_id(PipelineId::new(id)).await, Ok(None)));
}

#[tokio::test]
async fn delete_pipeline_of_an_unknown_id_reports_an_error_response() {
    let ctx = test_ctx().await;
    let response = dispatch(Request::DeletePipeline { pipeline_id: 999 }, &ctx).await;
    assert!(matches!(response, Response::Error { .. }));
}

#[tokio::test]
async fn set_schedule_cron_updates_both_db_and_scheduler() {
    let ctx = test_ctx().await;
    let create = dispatch(
        Request::SetPipeline {
            name: "amber-river".to_string(),
            py_name: "p.py".to_string(),
            dir_name: "alpha".to_string(),
            py_timestamp: 0.0,
        },
        &ctx,
    )
    .await;
    let Response::PipelineId { id } = create else { panic!("setup failed") };
    let scheduling = ctx.db.all_pipelines_scheduling().await.expect("query");
    let schedule_id = scheduling[0].schedule_id.expect("schedule exists");

    let response =
        dispatch(Request::SetScheduleCron { schedule_id: schedule_id.get(), cron: "*/5 * * * *".to_string() }, &ctx)
            .await;
    assert_eq!(response, Response::Ok);

    let schedule = ctx.db.pipeline_schedule(PipelineId::new(id), schedule_id).await.expect("query schedule");
    assert_eq!(schedule.cron, "*/5 * * * *");
    assert!(ctx.scheduler.next_wakeup().is_some());
}

#[tokio::test]
async fn set_schedule_now_clears_the_trigger_and_fires_exactly_once() {
    let ctx = test_ctx().await;
    let create = dispatch(
        Request::SetPipeline {
            name: "amber-river".to_string(),
            py_name: "p.py".to_string(),
            dir_name: "alpha".to_string(),
            py_timestamp: 0.0,
        },
        &ctx,
    )
    .await;
    let Response::PipelineId { id } = create else { panic!("setup failed") };
    let scheduling = ctx.db.all_pipelines_scheduling().await.expect("query");
    let schedule_id = scheduling[0].schedule_id.expect("schedule exists");

    let response = dispatch(Request::SetScheduleNow { schedule_id: schedule_id.get() }, &ctx).await;
    assert_eq!(response, Response::Ok);

    let schedule = ctx.db.pipeline_schedule(PipelineId::new(id), schedule_id).await.expect("query schedule");
    assert_eq!(schedule.cron, "");
    assert_eq!(schedule.at, "");

    let due = ctx.scheduler.poll();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].schedule_id, schedule_id);

    // The one-shot trigger is parked after firing, so a second poll finds
    // nothing due.
    assert!(ctx.scheduler.poll().is_empty());
}

#[tokio::test]
async fn set_schedule_now_on_a_paused_schedule_does_not_implicitly_unpause() {
    let ctx = test_ctx().await;
    let create = dispatch(
        Request::SetPipeline {
            name: "amber-river".to_string(),
            py_name: "p.py".to_string(),
            dir_name: "alpha".to_string(),
            py_timestamp: 0.0,
        },
        &ctx,
    )
    .await;
    let Response::PipelineId { .. } = create else { panic!("setup failed") };
    let scheduling = ctx.db.all_pipelines_scheduling().await.expect("query");
    let schedule_id = scheduling[0].schedule_id.expect("schedule exists");

    ctx.db.update_paused(schedule_id, true).await.expect("pause in db");
    ctx.scheduler.set_paused(schedule_id, true).expect("pause in scheduler");

    let response = dispatch(Request::SetScheduleNow { schedule_id: schedule_id.get() }, &ctx).await;
    assert_eq!(response, Response::Ok);

    // Rescheduled, but still paused, so the registry never reports it due.
    assert!(ctx.scheduler.poll().is_empty());
}

#[tokio::test]
async fn rekey_db_reencrypts_the_store_and_updates_the_shared_secret() {
    let ctx = test_ctx().await;
    dispatch(
        Request::SetKeyValue { key: "GREETING".to_string(), value: "hello".to_string(), table: None },
        &ctx,
    )
    .await;

    let response = dispatch(Request::RekeyDb { new_secret: "new-secret".to_string() }, &ctx).await;
    assert_eq!(response, Response::Ok);
    assert_eq!(*ctx.master_secret.lock(), "new-secret");

    let value = ctx
        .store
        .get("new-secret", gt_store::DEFAULT_TABLE, "GREETING")
        .await
        .expect("decrypt under new secret");
    assert_eq!(value, Some("hello".to_string()));
}

#[tokio::test]
async fn ping_returns_pong() {
    let ctx = test_ctx().await;
    let response = dispatch(Request::Ping, &ctx).await;
    assert_eq!(response, Response::Pong);
}
