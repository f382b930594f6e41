//! Behavioral specifications for the gluetube daemon (spec §8 end-to-end
//! scenarios). These tests are black-box: they spawn the real `gluetubed`
//! binary against a freshly built configuration directory, talk to it over
//! its Unix control socket with `gt_protocol`, and verify outcomes by
//! reading the database and store files directly.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use gt_core::id::PipelineId;
use gt_protocol::{Request, Response};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const WAIT_MAX: Duration = Duration::from_secs(5);

/// Resolve the `gluetubed` binary built alongside this test binary.
fn gluetubed_binary() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug/gluetubed");
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join("gluetubed");
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

/// A running `gluetubed` instance under an isolated tempdir, torn down on
/// drop.
struct TestDaemon {
    child: Child,
    dir: tempfile::TempDir,
    pub socket_file: PathBuf,
    pub db_path: PathBuf,
    pub kv_path: PathBuf,
    pub pipeline_dir: PathBuf,
}

impl TestDaemon {
    fn start(scan_interval_secs: u64) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let pipeline_dir = dir.path().join("pipelines");
        std::fs::create_dir_all(&pipeline_dir).expect("pipeline dir");

        let socket_file = dir.path().join("gluetube.sock");
        let db_path = dir.path().join("gluetube.db");
        let kv_path = dir.path().join("gluetube_kv.db");
        let pid_file = dir.path().join("gluetube.pid");
        let log_file = dir.path().join("gluetube.log");

        std::fs::write(
            dir.path().join("gluetube.cfg"),
            format!(
                r#"
                PIPELINE_DIR = "{pipeline_dir}"
                PIPELINE_SCAN_INTERVAL = "{scan_interval_secs}"
                SQLITE_DIR = "{sqlite_dir}"
                SQLITE_APP_NAME = "gluetube.db"
                SQLITE_KV_NAME = "gluetube_kv.db"
                SQLITE_TOKEN = "PjhSLgp2FbZqbdMzwLEPK-VRaIBiiN_WwEwnAnqhA_o="
                SOCKET_FILE = "{socket_file}"
                PID_FILE = "{pid_file}"
                GLUETUBE_LOG_FILE = "{log_file}"
                "#,
                pipeline_dir = pipeline_dir.display(),
                sqlite_dir = dir.path().display(),
                socket_file = socket_file.display(),
                pid_file = pid_file.display(),
                log_file = log_file.display(),
            ),
        )
        .expect("write config");

        let mut child = Command::new(gluetubed_binary())
            .current_dir(dir.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn gluetubed");

        let stdout = child.stdout.take().expect("captured stdout");
        let mut reader = BufReader::new(stdout);
        let deadline = Instant::now() + WAIT_MAX;
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                panic!("gluetubed exited before signalling READY");
            }
            if line.trim() == "READY" {
                break;
            }
            if Instant::now() > deadline {
                panic!("gluetubed did not signal READY in time");
            }
        }

        Self { child, dir, socket_file, db_path, kv_path, pipeline_dir }
    }

    async fn db(&self) -> gt_db::Db {
        gt_db::Db::open_read_only(&self.db_path).await.expect("open db read-only")
    }

    async fn store(&self) -> gt_store::Store {
        gt_store::Store::open_writable(&self.kv_path).await.expect("open store")
    }
}

impl Drop for TestDaemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = &self.dir;
    }
}

async fn call(socket_file: &Path, request: Request) -> Response {
    gt_protocol::call(socket_file, &request).await.expect("rpc call succeeds")
}

async fn wait_until<F, Fut>(mut predicate: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = Instant::now() + WAIT_MAX;
    loop {
        if predicate().await {
            return true;
        }
        if Instant::now() > deadline {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[tokio::test]
async fn discovery_round_trip_registers_a_parked_schedule() {
    let daemon = TestDaemon::start(1);
    std::fs::create_dir_all(daemon.pipeline_dir.join("alpha")).expect("pipeline subdir");
    std::fs::write(daemon.pipeline_dir.join("alpha").join("p.py"), "print('hello')")
        .expect("write pipeline source");

    let db = daemon.db().await;
    let found = wait_until(|| async {
        db.all_pipelines_scheduling().await.map(|rows| !rows.is_empty()).unwrap_or(false)
    })
    .await;
    assert!(found, "discovery did not register the on-disk pipeline in time");

    let rows = db.all_pipelines_scheduling().await.expect("query scheduling");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].py_name, "p.py");
    assert_eq!(rows[0].dir_name, "alpha");
    assert!(rows[0].schedule_id.is_some());
    assert_eq!(rows[0].cron, "");
    assert_eq!(rows[0].at, "");
}

#[tokio::test]
async fn cron_set_then_at_override_replaces_the_trigger() {
    let daemon = TestDaemon::start(3600);
    std::fs::create_dir_all(daemon.pipeline_dir.join("alpha")).expect("pipeline subdir");
    std::fs::write(daemon.pipeline_dir.join("alpha").join("p.py"), "print('hello')")
        .expect("write pipeline source");

    let response = call(
        &daemon.socket_file,
        Request::SetPipeline {
            name: "amber-river".to_string(),
            py_name: "p.py".to_string(),
            dir_name: "alpha".to_string(),
            py_timestamp: 1000.0,
        },
    )
    .await;
    let Response::PipelineId { id: pipeline_id } = response else {
        panic!("expected PipelineId response, got {response:?}")
    };

    let db = daemon.db().await;
    let rows = db.all_pipelines_scheduling().await.expect("query scheduling");
    let schedule_id = rows
        .iter()
        .find(|r| r.pipeline_id == PipelineId::new(pipeline_id))
        .and_then(|r| r.schedule_id)
        .expect("schedule exists");

    let response =
        call(&daemon.socket_file, Request::SetScheduleCron { schedule_id: schedule_id.get(), cron: "*/5 * * * *".to_string() })
            .await;
    assert_eq!(response, Response::Ok);

    let schedule = db.pipeline_schedule(PipelineId::new(pipeline_id), schedule_id).await.expect("query schedule");
    assert_eq!(schedule.cron, "*/5 * * * *");
    assert_eq!(schedule.at, "");

    let response = call(
        &daemon.socket_file,
        Request::SetScheduleAt { schedule_id: schedule_id.get(), at: "2099-01-01T00:00:00".to_string() },
    )
    .await;
    assert_eq!(response, Response::Ok);

    let schedule = db.pipeline_schedule(PipelineId::new(pipeline_id), schedule_id).await.expect("query schedule");
    assert_eq!(schedule.cron, "");
    assert_eq!(schedule.at, "2099-01-01T00:00:00");
}

#[tokio::test]
async fn delete_pipeline_cascades_its_schedule_and_runs() {
    let daemon = TestDaemon::start(3600);

    let response = call(
        &daemon.socket_file,
        Request::SetPipeline {
            name: "amber-river".to_string(),
            py_name: "p.py".to_string(),
            dir_name: "alpha".to_string(),
            py_timestamp: 1000.0,
        },
    )
    .await;
    let Response::PipelineId { id: pipeline_id } = response else {
        panic!("expected PipelineId response, got {response:?}")
    };

    let response = call(&daemon.socket_file, Request::DeletePipeline { pipeline_id }).await;
    assert_eq!(response, Response::Ok);

    let db = daemon.db().await;
    let rows = db.all_pipelines_scheduling().await.expect("query scheduling");
    assert!(rows.iter().all(|r| r.pipeline_id != PipelineId::new(pipeline_id)));
}

#[tokio::test]
async fn store_round_trip_under_the_configured_master_secret() {
    let daemon = TestDaemon::start(3600);

    let response = call(
        &daemon.socket_file,
        Request::SetKeyValue { key: "TEST".to_string(), value: "SECRET".to_string(), table: None },
    )
    .await;
    assert_eq!(response, Response::Ok);

    let store = daemon.store().await;
    let raw_values = sqlx_raw_values(&daemon.kv_path).await;
    let raw = raw_values.into_iter().find(|(k, _)| k == "TEST").map(|(_, v)| v).expect("row exists");
    assert_ne!(raw, "SECRET", "the value column must hold ciphertext, not plaintext");

    let decrypted = store
        .get("PjhSLgp2FbZqbdMzwLEPK-VRaIBiiN_WwEwnAnqhA_o=", gt_store::DEFAULT_TABLE, "TEST")
        .await
        .expect("decrypt under the configured master secret");
    assert_eq!(decrypted, Some("SECRET".to_string()));
}

async fn sqlx_raw_values(kv_path: &Path) -> Vec<(String, String)> {
    use sqlx::Row;
    let options = sqlx::sqlite::SqliteConnectOptions::new().filename(kv_path).read_only(true);
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("open kv db directly");
    sqlx::query("SELECT key, value FROM common")
        .fetch_all(&pool)
        .await
        .expect("select raw rows")
        .into_iter()
        .map(|row| (row.get::<String, _>("key"), row.get::<String, _>("value")))
        .collect()
}

#[tokio::test]
async fn a_zero_exit_pipeline_finalizes_as_finished() {
    let daemon = TestDaemon::start(1);
    std::fs::create_dir_all(daemon.pipeline_dir.join("alpha")).expect("pipeline subdir");
    std::fs::write(daemon.pipeline_dir.join("alpha").join("p.py"), "import sys; sys.exit(0)")
        .expect("write pipeline source");

    let response = call(
        &daemon.socket_file,
        Request::SetPipeline {
            name: "amber-river".to_string(),
            py_name: "p.py".to_string(),
            dir_name: "alpha".to_string(),
            py_timestamp: 1000.0,
        },
    )
    .await;
    let Response::PipelineId { id: pipeline_id } = response else {
        panic!("expected PipelineId response, got {response:?}")
    };

    let db = daemon.db().await;
    let rows = db.all_pipelines_scheduling().await.expect("query scheduling");
    let schedule_id = rows
        .iter()
        .find(|r| r.pipeline_id == PipelineId::new(pipeline_id))
        .and_then(|r| r.schedule_id)
        .expect("schedule exists");

    // A cron that fires every minute is enough to get one fire within the
    // wait window; the scheduler's own tick loop picks it up.
    let response =
        call(&daemon.socket_file, Request::SetScheduleCron { schedule_id: schedule_id.get(), cron: "* * * * *".to_string() })
            .await;
    assert_eq!(response, Response::Ok);

    let finished = wait_until(|| async {
        db.recent_runs(schedule_id, 10)
            .await
            .map(|runs| runs.iter().any(|r| r.status == "finished"))
            .unwrap_or(false)
    })
    .await;
    assert!(finished, "pipeline did not finalize as finished in time");

    let runs = db.recent_runs(schedule_id, 10).await.expect("query runs");
    let run = runs.iter().find(|r| r.status == "finished").expect("finished run");
    assert!(run.start_time <= run.end_time.clone().expect("end time recorded"));

    let schedule = db.pipeline_schedule(PipelineId::new(pipeline_id), schedule_id).await.expect("query schedule");
    assert_eq!(schedule.latest_run, Some(run.id));
}
