// SPDX-License-Identifier: MIT

//! The in-memory job registry (spec §4.5): every schedule's current
//! trigger, keyed by [`ScheduleId`]. Rebuilt from `all_pipelines_scheduling`
//! at daemon startup and kept in sync with the database by every RPC
//! handler that mutates a schedule.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use gt_core::id::{PipelineId, ScheduleId};

use crate::error::SchedulerError;
use crate::trigger::Trigger;

struct Entry {
    pipeline_id: PipelineId,
    trigger: Trigger,
    paused: bool,
    /// The last instant this entry's cron trigger was checked for due
    /// occurrences. `due()` only needs to look for fires strictly after
    /// this point, so the registry never fires the same occurrence twice
    /// regardless of how the tick loop is paced.
    last_checked: DateTime<Utc>,
}

/// A schedule due to run, returned by [`Registry::due`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueJob {
    pub schedule_id: ScheduleId,
    pub pipeline_id: PipelineId,
}

#[derive(Default)]
pub struct Registry {
    entries: HashMap<ScheduleId, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a schedule's trigger. Used both for fresh
    /// schedules and for `set_schedule_cron`/`set_schedule_at`, which
    /// overwrite the existing entry wholesale. `now` seeds the entry's
    /// due-checking window so a cron schedule never fires for occurrences
    /// that were already in the past when it was registered.
    pub fn set(
        &mut self,
        schedule_id: ScheduleId,
        pipeline_id: PipelineId,
        cron: &str,
        at: &str,
        paused: bool,
        now: DateTime<Utc>,
    ) -> Result<(), SchedulerError> {
        let trigger = Trigger::from_row(cron, at)?;
        self.entries.insert(
            schedule_id,
            Entry {
                pipeline_id,
                trigger,
                paused,
                last_checked: now,
            },
        );
        Ok(())
    }

    /// Park a schedule in place: clear its trigger without touching
    /// `paused` (spec §9 Open Question decision for `set_schedule_now`).
    pub fn park(&mut self, schedule_id: ScheduleId) -> Result<(), SchedulerError> {
        let entry = self
            .entries
            .get_mut(&schedule_id)
            .ok_or(SchedulerError::NotFound(schedule_id))?;
        entry.trigger = Trigger::Parked;
        Ok(())
    }

    pub fn set_paused(&mut self, schedule_id: ScheduleId, paused: bool) -> Result<(), SchedulerError> {
        let entry = self
            .entries
            .get_mut(&schedule_id)
            .ok_or(SchedulerError::NotFound(schedule_id))?;
        entry.paused = paused;
        Ok(())
    }

    pub fn remove(&mut self, schedule_id: ScheduleId) {
        self.entries.remove(&schedule_id);
    }

    pub fn contains(&self, schedule_id: ScheduleId) -> bool {
        self.entries.contains_key(&schedule_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every schedule whose trigger has an occurrence in `(last_checked,
    /// now]`. One-shot `at` triggers are parked immediately after firing
    /// so they never fire twice; cron triggers advance `last_checked` to
    /// `now` regardless of whether they fired this round.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<DueJob> {
        let mut fired = Vec::new();
        for (schedule_id, entry) in self.entries.iter_mut() {
            if entry.paused {
                continue;
            }
            let is_due = match &entry.trigger {
                Trigger::Cron(schedule) => schedule
                    .after(&entry.last_checked)
                    .next()
                    .is_some_and(|next| next <= now),
                Trigger::At(at) => *at <= now,
                Trigger::Parked => false,
            };
            if is_due {
                fired.push(DueJob {
                    schedule_id: *schedule_id,
                    pipeline_id: entry.pipeline_id,
                });
                if matches!(entry.trigger, Trigger::At(_)) {
                    entry.trigger = Trigger::Parked;
                }
            }
            entry.last_checked = now;
        }
        fired
    }

    /// The next time any unpaused, unparked schedule will fire, used to
    /// size the tick loop's sleep so idle daemons don't busy-poll.
    pub fn next_wakeup(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.entries
            .values()
            .filter(|entry| !entry.paused)
            .filter_map(|entry| entry.trigger.next_after(after))
            .min()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
