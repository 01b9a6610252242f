//! Stale claim sweep.
//!
//! Releases claims that have outlived the service's `StalePolicy`. The sweep
//! is idempotent: a released task has no claim, so a second pass over it is
//! a no-op.

use chrono::{DateTime, Utc};
use crew_core::audit_detail::ReleasedDetail;
use crew_core::entities::Task;
use crew_core::enums::{AuditAction, TaskStatus};
use crew_core::responses::{ReleasedTask, SweepReport};

use crate::error::DatabaseError;
use crate::helpers::now;
use crate::repos::audit::detail;
use crate::repos::lifecycle::{TransitionAudit, commit_transition, release_state};
use crate::repos::task::{SELECT_COLS, row_to_task};
use crate::service::CrewService;

impl CrewService {
    /// Claimed tasks whose status is one of `statuses`, oldest claim first.
    pub async fn claimed_tasks_in(
        &self,
        statuses: &[TaskStatus],
    ) -> Result<Vec<Task>, DatabaseError> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = (1..=statuses.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let params: Vec<libsql::Value> = statuses.iter().map(|s| s.as_str().into()).collect();

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM tasks
                     WHERE claimed_by IS NOT NULL AND status IN ({placeholders})
                     ORDER BY claimed_at"
                ),
                libsql::params_from_iter(params),
            )
            .await?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }

    /// Release every stale claim as of now.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if reading or writing the store fails. A task
    /// that changed between read and write is reported in `skipped`, not as
    /// an error.
    pub async fn release_stale_tasks(&self, dry_run: bool) -> Result<SweepReport, DatabaseError> {
        self.release_stale_tasks_at(now(), dry_run).await
    }

    /// Release every claim that is stale as of `now`.
    ///
    /// # Errors
    ///
    /// See [`CrewService::release_stale_tasks`].
    pub async fn release_stale_tasks_at(
        &self,
        now: DateTime<Utc>,
        dry_run: bool,
    ) -> Result<SweepReport, DatabaseError> {
        let candidates = self.claimed_tasks_in(self.policy().statuses()).await?;
        let scanned = candidates.len();
        let mut released = Vec::new();
        let mut skipped = Vec::new();

        for task in candidates.iter().filter(|t| self.policy().is_stale(t, now)) {
            let Some(claim) = task.claim.as_ref() else {
                continue;
            };
            let entry = ReleasedTask {
                id: task.id.clone(),
                title: task.title.clone(),
                from: task.status,
                previous_holder: claim.claimed_by.clone(),
                claimed_at: claim.claimed_at,
            };
            if dry_run {
                released.push(entry);
                continue;
            }

            let note = self.policy().release_note(&claim.claimed_by);
            let next = release_state(task, note.clone(), now);
            let audit = TransitionAudit {
                actor: None,
                action: AuditAction::Released,
                detail: detail(&ReleasedDetail {
                    previous_holder: claim.claimed_by.clone(),
                    claimed_at: claim.claimed_at,
                    from: task.status.to_string(),
                    note,
                })?,
            };
            if !commit_transition(self.db().conn(), task, &next, audit).await? {
                tracing::warn!(task = %task.id, "task changed during sweep, skipped");
                skipped.push(task.id.clone());
                continue;
            }
            tracing::info!(
                task = %task.id,
                holder = %claim.claimed_by,
                from = %task.status,
                "stale claim released"
            );
            released.push(entry);
        }

        tracing::info!(
            scanned,
            released = released.len(),
            skipped = skipped.len(),
            dry_run,
            "stale sweep finished"
        );
        Ok(SweepReport {
            swept_at: now,
            scanned,
            released,
            skipped,
            dry_run,
        })
    }
}
