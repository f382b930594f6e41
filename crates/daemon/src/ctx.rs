// SPDX-License-Identifier: MIT

//! Shared state for every RPC handler (spec §9 Design Notes): the single
//! writable database handle, the scheduler registry, and the encrypted
//! store, all owned by the daemon's accept/dispatch loop (spec §5 domain
//! a). Mirrors the teacher's `ListenCtx` shape.

use std::path::PathBuf;
use std::sync::Arc;

use gt_core::SystemClock;
use gt_db::Db;
use gt_scheduler::Scheduler;
use gt_store::Store;
use parking_lot::Mutex;

/// Context shared by every connection handler. Cheap to clone: every
/// field is either already reference-counted or small.
#[derive(Clone)]
pub struct DaemonCtx {
    pub db: Db,
    pub store: Store,
    pub scheduler: Scheduler<SystemClock>,
    pub socket_file: PathBuf,
    pub pipeline_dir: PathBuf,

    /// The store's master secret. Held behind a lock because
    /// [`Request::RekeyDb`](gt_protocol::Request::RekeyDb) replaces it.
    pub master_secret: Arc<Mutex<String>>,

    /// The configuration file the daemon loaded from, kept around so
    /// `rekey_db` can write the new secret back to it (spec §4.2).
    pub config: Arc<Mutex<gt_config::Config>>,

    /// Default retry policy for a newly discovered pipeline's first
    /// schedule (spec §4.7: auto-discovery installs one parked schedule).
    pub default_retry_on_crash: bool,
    pub default_max_retries: i64,
}
