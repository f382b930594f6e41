// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The in-memory scheduler (spec §4.5): a job registry of cron and
//! one-shot triggers, ticked on an interval to discover due work. The
//! scheduler itself never touches the database or spawns pipelines; it
//! hands [`DueJob`]s to the daemon over a channel, the same forwarding
//! shape the daemon uses elsewhere for background work.

mod error;
mod registry;
mod trigger;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gt_core::id::{PipelineId, ScheduleId};
use gt_core::{Clock, SystemClock};
use parking_lot::Mutex;
use tokio::sync::mpsc;

pub use error::SchedulerError;
pub use registry::DueJob;
use registry::Registry;

/// How often the tick loop checks for due schedules. Gluetube's coarsest
/// supported cron granularity is minutes, so a one-second tick is frequent
/// enough to never miss an occurrence while staying cheap.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// The scheduler's job registry, shared between the tick loop and every
/// RPC handler that adds, reschedules, or removes a schedule. Generic
/// over the clock so tests can drive it with [`gt_core::FakeClock`]
/// instead of waiting on real time.
pub struct Scheduler<C: Clock = SystemClock> {
    registry: Arc<Mutex<Registry>>,
    clock: C,
}

impl<C: Clock> Clone for Scheduler<C> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            clock: self.clock.clone(),
        }
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::new())),
            clock,
        }
    }

    /// Register or replace a schedule's trigger (spec §4.5). Called both
    /// when auto-discovery creates a pipeline's first schedule and by
    /// `set_schedule_cron`/`set_schedule_at`.
    pub fn set(
        &self,
        schedule_id: ScheduleId,
        pipeline_id: PipelineId,
        cron: &str,
        at: &str,
        paused: bool,
    ) -> Result<(), SchedulerError> {
        self.registry
            .lock()
            .set(schedule_id, pipeline_id, cron, at, paused, self.clock.now())
    }

    /// Park a schedule without touching `paused` (used once a one-shot
    /// `set_schedule_now` trigger has fired).
    pub fn park(&self, schedule_id: ScheduleId) -> Result<(), SchedulerError> {
        self.registry.lock().park(schedule_id)
    }

    /// The scheduler's current time, per its clock. Exposed so handlers can
    /// install a one-shot `at` trigger for "fire immediately" semantics
    /// (spec §6 `set_schedule_now`) without reaching for `Utc::now()`
    /// directly and bypassing the scheduler's (possibly fake) clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn set_paused(&self, schedule_id: ScheduleId, paused: bool) -> Result<(), SchedulerError> {
        self.registry.lock().set_paused(schedule_id, paused)
    }

    pub fn remove(&self, schedule_id: ScheduleId) {
        self.registry.lock().remove(schedule_id);
    }

    pub fn contains(&self, schedule_id: ScheduleId) -> bool {
        self.registry.lock().contains(schedule_id)
    }

    pub fn len(&self) -> usize {
        self.registry.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.lock().is_empty()
    }

    /// Poll once for due schedules, without spawning a background task.
    /// Exposed directly so tests (and `set_schedule_now`'s immediate-run
    /// semantics) can drive the registry without waiting on real time.
    pub fn poll(&self) -> Vec<DueJob> {
        let now = self.clock.now();
        self.registry.lock().due(now)
    }

    pub fn next_wakeup(&self) -> Option<DateTime<Utc>> {
        self.registry.lock().next_wakeup(self.clock.now())
    }

    /// Spawn the tick loop as a background task, forwarding each batch of
    /// due jobs to `tx`. Mirrors the daemon's other background forwarders:
    /// a `tokio::spawn`ed loop around `tokio::time::interval`.
    pub fn spawn_tick_loop(self, tx: mpsc::Sender<DueJob>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;
                for job in self.poll() {
                    if tx.send(job).await.is_err() {
                        tracing::warn!("scheduler tick loop: receiver dropped, stopping");
                        return;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
