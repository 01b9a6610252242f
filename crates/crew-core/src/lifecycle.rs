//! Coordination rules that do not depend on storage.
//!
//! - Staleness: a claim older than the policy threshold, on a task whose
//!   status is in the policy's stale set, is eligible for automatic release.
//! - Claim order: priority first (`urgent` → `low`), then newest first.
//! - Eligibility: the task must be unclaimed, claimable, and admit the
//!   actor's kind.

use std::cmp::Ordering;

use chrono::{DateTime, TimeDelta, Utc};

use crate::entities::Task;
use crate::enums::{ActorKind, TaskStatus};
use crate::errors::CoreError;

/// Default age after which a claim is considered abandoned.
pub const DEFAULT_STALE_AFTER: TimeDelta = TimeDelta::hours(2);

/// When a claim counts as stale, and for which statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalePolicy {
    threshold: TimeDelta,
    statuses: Vec<TaskStatus>,
}

impl Default for StalePolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_STALE_AFTER,
            statuses: vec![TaskStatus::InProgress, TaskStatus::Review],
        }
    }
}

impl StalePolicy {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the threshold is not positive, the
    /// status set is empty, or it names a status that never holds a claim.
    pub fn new(threshold: TimeDelta, statuses: Vec<TaskStatus>) -> Result<Self, CoreError> {
        if threshold <= TimeDelta::zero() {
            return Err(CoreError::Validation(
                "stale threshold must be positive".into(),
            ));
        }
        if statuses.is_empty() {
            return Err(CoreError::Validation(
                "stale policy needs at least one status".into(),
            ));
        }
        if let Some(bad) = statuses
            .iter()
            .find(|s| !matches!(s, TaskStatus::InProgress | TaskStatus::Review))
        {
            return Err(CoreError::Validation(format!(
                "status '{bad}' cannot hold a stale claim"
            )));
        }
        Ok(Self {
            threshold,
            statuses,
        })
    }

    /// Build from a threshold in seconds, as stored in configuration.
    ///
    /// # Errors
    ///
    /// See [`StalePolicy::new`].
    pub fn from_secs(secs: u64, statuses: Vec<TaskStatus>) -> Result<Self, CoreError> {
        let threshold = i64::try_from(secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| CoreError::Validation(format!("stale threshold {secs}s is too large")))?;
        Self::new(threshold, statuses)
    }

    #[must_use]
    pub const fn threshold(&self) -> TimeDelta {
        self.threshold
    }

    #[must_use]
    pub fn statuses(&self) -> &[TaskStatus] {
        &self.statuses
    }

    /// Whether `task` holds a claim that has outlived the threshold at `now`.
    #[must_use]
    pub fn is_stale(&self, task: &Task, now: DateTime<Utc>) -> bool {
        if !self.statuses.contains(&task.status) {
            return false;
        }
        task.claim
            .as_ref()
            .is_some_and(|claim| now - claim.claimed_at > self.threshold)
    }

    /// The note recorded on a task released by the sweep.
    #[must_use]
    pub fn release_note(&self, holder: &str) -> String {
        format!(
            "auto-released: claim by {holder} exceeded {}",
            format_delta(self.threshold)
        )
    }
}

/// Ordering used to pick among claimable tasks.
#[must_use]
pub fn claim_order(a: &Task, b: &Task) -> Ordering {
    a.priority
        .rank()
        .cmp(&b.priority.rank())
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort tasks in claim order.
pub fn sort_for_claim(tasks: &mut [Task]) {
    tasks.sort_by(claim_order);
}

/// Whether an actor of `kind` may claim `task` now.
#[must_use]
pub const fn is_eligible(task: &Task, kind: ActorKind) -> bool {
    task.is_available() && task.assignee.admits(kind)
}

/// Compact rendering of a duration: `2h`, `90m`, `45s`, `1h30m`.
#[must_use]
pub fn format_delta(delta: TimeDelta) -> String {
    let total = delta.num_seconds();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    if seconds > 0 || out.is_empty() {
        out.push_str(&format!("{seconds}s"));
    }
    out
}
