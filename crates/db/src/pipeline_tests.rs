use super::*;

async fn test_db() -> Db {
    Db::open_in_memory().await.expect("open in-memory db")
}

#[tokio::test]
async fn insert_and_fetch_round_trips() {
    let db = test_db().await;
    let id = db
        .insert_pipeline("daily-report", "daily_report", "daily-report", 1_700_000_000.0)
        .await
        .expect("insert pipeline");

    let fetched = db
        .pipeline_by_id(id)
        .await
        .expect("query")
        .expect("pipeline exists");
    assert_eq!(fetched.name, "daily-report");
    assert_eq!(fetched.py_name, "daily_report");
    assert_eq!(fetched.dir_name, "daily-report");
}

#[tokio::test]
async fn duplicate_name_is_rejected() {
    let db = test_db().await;
    db.insert_pipeline("dup", "dup", "dup", 1.0)
        .await
        .expect("first insert succeeds");

    let err = db
        .insert_pipeline("dup", "dup2", "dup2", 2.0)
        .await
        .expect_err("second insert with same name fails");
    assert!(matches!(err, DbError::DuplicatePipelineName(name) if name == "dup"));
}

#[tokio::test]
async fn pipeline_by_name_returns_none_when_absent() {
    let db = test_db().await;
    assert!(db.pipeline_by_name("ghost").await.expect("query").is_none());
}

#[tokio::test]
async fn delete_pipeline_cascades_to_schedule_and_run() {
    let db = test_db().await;
    let pipeline_id = db.insert_pipeline("p", "p", "p", 1.0).await.expect("insert pipeline");
    let schedule_id = db
        .insert_schedule(pipeline_id, "* * * * *", "", false, false, 0)
        .await
        .expect("insert schedule");
    db.insert_run(pipeline_id, schedule_id, "2026-01-01T00:00:00Z")
        .await
        .expect("insert run");

    db.delete_pipeline(pipeline_id).await.expect("delete pipeline");

    assert!(db.pipeline_by_id(pipeline_id).await.expect("query").is_none());
    assert!(db
        .pipeline_schedules_id(pipeline_id)
        .await
        .expect("query")
        .is_empty());
}

#[tokio::test]
async fn delete_missing_pipeline_is_not_found() {
    let db = test_db().await;
    let err = db
        .delete_pipeline(PipelineId::new(999))
        .await
        .expect_err("deleting a missing pipeline fails");
    assert!(matches!(err, DbError::NotFound(_)));
}

#[tokio::test]
async fn all_pipelines_scheduling_left_joins_unscheduled_pipelines() {
    let db = test_db().await;
    let with_schedule = db
        .insert_pipeline("scheduled", "scheduled", "scheduled", 1.0)
        .await
        .expect("insert pipeline");
    db.insert_schedule(with_schedule, "0 * * * *", "", false, false, 0)
        .await
        .expect("insert schedule");
    db.insert_pipeline("unscheduled", "unscheduled", "unscheduled", 1.0)
        .await
        .expect("insert pipeline");

    let rows = db.all_pipelines_scheduling().await.expect("query");
    assert_eq!(rows.len(), 2);
    let unscheduled = rows
        .iter()
        .find(|row| row.name == "unscheduled")
        .expect("unscheduled row present");
    assert!(unscheduled.schedule_id.is_none());
    let scheduled = rows
        .iter()
        .find(|row| row.name == "scheduled")
        .expect("scheduled row present");
    assert_eq!(scheduled.cron, "0 * * * *");
}

#[tokio::test]
async fn summary_pipelines_reports_latest_run_fields() {
    let db = test_db().await;
    let pipeline_id = db.insert_pipeline("p", "p", "p", 1.0).await.expect("insert pipeline");
    let schedule_id = db
        .insert_schedule(pipeline_id, "", "2026-01-01T00:00:00Z", false, false, 0)
        .await
        .expect("insert schedule");
    let run_id = db
        .insert_run(pipeline_id, schedule_id, "2026-01-01T00:00:00Z")
        .await
        .expect("insert run");
    db.finish_run(run_id, "success", None, "2026-01-01T00:05:00Z")
        .await
        .expect("finish run");
    db.set_latest_run(schedule_id, run_id).await.expect("set latest run");

    let rows = db.summary_pipelines().await.expect("query");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].latest_run_status.as_deref(), Some("success"));
    assert_eq!(rows[0].at, "2026-01-01T00:00:00Z");
}
