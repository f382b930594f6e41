// SPDX-License-Identifier: MIT

//! A schedule's in-memory trigger: either a recurring cron expression, a
//! one-shot timestamp, or "parked" (neither set, per spec §3).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule as CronSchedule;

use crate::error::SchedulerError;

#[derive(Clone)]
pub enum Trigger {
    Cron(CronSchedule),
    At(DateTime<Utc>),
    Parked,
}

impl Trigger {
    /// Parse from a schedule row's `cron`/`at` pair. At most one is
    /// expected to be non-empty; if both are empty the trigger is
    /// [`Trigger::Parked`].
    pub fn from_row(cron: &str, at: &str) -> Result<Self, SchedulerError> {
        if !cron.is_empty() {
            return Ok(Trigger::Cron(parse_cron(cron)?));
        }
        if !at.is_empty() {
            return Ok(Trigger::At(parse_at(at)?));
        }
        Ok(Trigger::Parked)
    }

    /// The next time this trigger fires at or after `after`, or `None` if
    /// it never will (an exhausted `at` trigger, or `Parked`).
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Trigger::Cron(schedule) => schedule.after(&after).next(),
            Trigger::At(at) => (*at > after).then_some(*at),
            Trigger::Parked => None,
        }
    }
}

/// Parse a cron expression. Accepts the traditional five-field Unix form
/// (`minute hour day-of-month month day-of-week`) by prepending a `0`
/// seconds field, since the `cron` crate's own grammar always includes
/// seconds.
pub fn parse_cron(expr: &str) -> Result<CronSchedule, SchedulerError> {
    let field_count = expr.split_whitespace().count();
    let normalized = if field_count == 5 {
        format!("0 {expr}")
    } else {
        expr.to_string()
    };
    CronSchedule::from_str(&normalized)
        .map_err(|err| SchedulerError::InvalidCron(expr.to_string(), err.to_string()))
}

fn parse_at(expr: &str) -> Result<DateTime<Utc>, SchedulerError> {
    DateTime::parse_from_rfc3339(expr)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| SchedulerError::InvalidAt(expr.to_string(), err.to_string()))
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
