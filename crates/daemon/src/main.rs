// SPDX-License-Identifier: MIT

//! `gluetubed`: the daemon binary. Loads configuration, opens the
//! database and encrypted store, warms the in-memory scheduler from the
//! database, binds the control socket, and runs the accept loop alongside
//! the scheduler tick loop, the run worker, and auto-discovery (spec
//! §4.8, §5).

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::Path;
use std::sync::Arc;

use gt_core::metadata;
use gt_core::SystemClock;
use gt_daemon::accept::Acceptor;
use gt_daemon::ctx::DaemonCtx;
use gt_daemon::error::DaemonError;
use gt_daemon::lifecycle::{self, Daemon};
use gt_db::Db;
use gt_runner::{RunRequest, Runner};
use gt_scheduler::Scheduler;
use gt_store::Store;
use parking_lot::Mutex;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut foreground = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("{}", metadata::banner());
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            "-f" => foreground = true,
            "-b" | "-s" => {
                eprintln!("error: '{arg}' is handled by the gluetube CLI, not gluetubed directly");
                std::process::exit(1);
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                eprintln!("Usage: gluetubed [-f | --help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = gt_config::Config::load(&lifecycle::default_config_locations())?;

    rotate_log_if_needed(&config.gluetube_log_file);
    write_startup_marker(&config)?;
    let _log_guard = setup_logging(&config, foreground)?;

    info!(version = metadata::VERSION, "starting gluetube daemon");

    let db_path = config.sqlite_dir.join(&config.sqlite_app_name);
    let kv_path = config.sqlite_dir.join(&config.sqlite_kv_name);
    let db = Db::open_writable(&db_path).await?;
    let store = Store::open_writable(&kv_path).await?;

    let scheduler = Scheduler::new(SystemClock);
    for row in db.all_pipelines_scheduling().await? {
        if let Some(schedule_id) = row.schedule_id {
            if let Err(err) = scheduler.set(schedule_id, row.pipeline_id, &row.cron, &row.at, row.paused) {
                warn!(pipeline = %row.name, error = %err, "failed to warm scheduler entry from database");
            }
        }
    }

    let (daemon, listener) = match Daemon::startup(config.clone()) {
        Ok(result) => result,
        Err(DaemonError::AlreadyRunning) => {
            eprintln!("gluetubed is already running (pid file locked: {})", config.pid_file.display());
            std::process::exit(1);
        }
        Err(err) => {
            error!(error = %err, "failed to start daemon");
            return Err(err.into());
        }
    };

    let ctx = Arc::new(DaemonCtx {
        db: db.clone(),
        store,
        scheduler: scheduler.clone(),
        socket_file: config.socket_file.clone(),
        pipeline_dir: config.pipeline_dir.clone(),
        master_secret: Arc::new(Mutex::new(config.sqlite_token.clone())),
        config: Arc::new(Mutex::new(config.clone())),
        default_retry_on_crash: false,
        default_max_retries: 0,
    });

    let (due_tx, due_rx) = mpsc::channel(64);
    scheduler.spawn_tick_loop(due_tx);
    spawn_run_worker(due_rx, Arc::clone(&ctx));

    let discovery =
        gt_discovery::Discovery::new(db.clone(), config.pipeline_dir.clone(), config.socket_file.clone());
    discovery.spawn_scan_loop(config.pipeline_scan_interval);

    tokio::spawn(Acceptor::new(listener, Arc::clone(&ctx)).run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(socket = %ctx.socket_file.display(), "daemon ready");
    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    daemon.shutdown();
    info!("daemon stopped");
    Ok(())
}

/// Run one [`gt_runner::Runner`] per due job, concurrently. A crashing
/// pipeline is already durably recorded by the runner itself (spec
/// §4.6); the worker only needs to log it.
fn spawn_run_worker(mut due_rx: mpsc::Receiver<gt_scheduler::DueJob>, ctx: Arc<DaemonCtx>) {
    tokio::spawn(async move {
        while let Some(job) = due_rx.recv().await {
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move {
                let pipeline = match ctx.db.pipeline_by_id(job.pipeline_id).await {
                    Ok(Some(pipeline)) => pipeline,
                    Ok(None) => {
                        warn!(
                            pipeline_id = job.pipeline_id.get(),
                            "due job for a pipeline that no longer exists"
                        );
                        return;
                    }
                    Err(err) => {
                        error!(error = %err, "failed to look up due pipeline");
                        return;
                    }
                };

                let master_secret = ctx.master_secret.lock().clone();
                let config = ctx.config.lock();
                let runner = Runner::new(
                    ctx.store.clone(),
                    ctx.pipeline_dir.clone(),
                    ctx.socket_file.clone(),
                    master_secret,
                    config.http_proxy.clone(),
                    config.https_proxy.clone(),
                    SystemClock,
                );
                drop(config);

                let request = RunRequest {
                    pipeline_id: job.pipeline_id,
                    schedule_id: job.schedule_id,
                    name: pipeline.name.clone(),
                    py_name: pipeline.py_name,
                    dir_name: pipeline.dir_name,
                };

                if let Err(err) = runner.run(request).await {
                    error!(pipeline = %pipeline.name, error = %err, "pipeline run failed");
                }
            });
        }
    });
}

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`]. Best-effort:
/// rotation failures are silently ignored so the daemon still starts.
fn rotate_log_if_needed(log_path: &Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

const STARTUP_MARKER_PREFIX: &str = "--- gluetubed: starting (pid: ";

fn write_startup_marker(config: &gt_config::Config) -> Result<(), DaemonError> {
    use std::io::Write;

    if let Some(parent) = config.gluetube_log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file =
        std::fs::OpenOptions::new().create(true).append(true).open(&config.gluetube_log_file)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;
    Ok(())
}

fn setup_logging(
    config: &gt_config::Config,
    foreground: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard, DaemonError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.gluetube_log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.gluetube_log_file.parent().unwrap_or_else(|| Path::new(".")),
        config.gluetube_log_file.file_name().unwrap_or_else(|| std::ffi::OsStr::new("gluetube.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry =
        tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking));

    if foreground {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    } else {
        registry.init();
    }

    Ok(guard)
}

fn print_help() {
    println!("{}", metadata::banner());
    println!("The Gluetube scheduler daemon");
    println!();
    println!("USAGE:");
    println!("    gluetubed [-f]");
    println!();
    println!("The daemon is typically started by the `gluetube` CLI and should not");
    println!("be invoked directly. It listens on a Unix socket for commands.");
    println!();
    println!("OPTIONS:");
    println!("    -f               Run in the foreground, also logging to stderr");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}
