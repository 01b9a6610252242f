//! Coordination transitions: claim, unclaim, submit for review, complete,
//! and admin status changes.
//!
//! Each operation reads the task, decides with the crew-core rules, then
//! writes with a guard on the status and claim it read. A guarded write that
//! changes no row lost a race with another actor and is reported, never
//! retried.

use chrono::{DateTime, Utc};
use crew_core::actor::Actor;
use crew_core::audit_detail::{
    ClaimedDetail, CompletionDetail, ReleasedDetail, StatusChangedDetail,
};
use crew_core::entities::{Claim, Task};
use crew_core::enums::{AuditAction, TaskStatus};
use crew_core::errors::CoreError;
use crew_core::lifecycle::{is_eligible, sort_for_claim};

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, now, to_json_text};
use crate::repos::audit::{detail, record_with};
use crate::repos::task::{CLAIM_ORDER, SELECT_COLS, row_to_task};
use crate::service::CrewService;

fn claim_columns(claim: Option<&Claim>) -> (Option<String>, Option<String>) {
    claim.map_or((None, None), |c| {
        (Some(c.claimed_by.clone()), Some(format_datetime(c.claimed_at)))
    })
}

/// Write `next` over `observed` only if the row still has the status and
/// claim that were read. Returns whether the row changed.
pub(crate) async fn write_guarded(
    conn: &libsql::Connection,
    observed: &Task,
    next: &Task,
) -> Result<bool, DatabaseError> {
    let (held_by, held_at) = claim_columns(observed.claim.as_ref());
    let (next_by, next_at) = claim_columns(next.claim.as_ref());
    let changed = conn
        .execute(
            "UPDATE tasks SET status = ?1, claimed_by = ?2, claimed_at = ?3, completed_at = ?4,
                 released_at = ?5, metadata = ?6, updated_at = ?7
             WHERE id = ?8 AND status = ?9 AND claimed_by IS ?10 AND claimed_at IS ?11",
            libsql::params![
                next.status.as_str(),
                next_by,
                next_at,
                next.completed_at.map(format_datetime),
                next.released_at.map(format_datetime),
                to_json_text(&next.metadata)?,
                format_datetime(next.updated_at),
                observed.id.as_str(),
                observed.status.as_str(),
                held_by,
                held_at
            ],
        )
        .await?;
    Ok(changed == 1)
}

/// The audit row that accompanies a guarded transition.
pub(crate) struct TransitionAudit<'a> {
    pub actor: Option<&'a str>,
    pub action: AuditAction,
    pub detail: serde_json::Value,
}

/// [`write_guarded`] plus its audit entry in one transaction, stamped with
/// `next.updated_at`. A lost race rolls back and returns `false`; a failed
/// audit insert rolls the write back too.
pub(crate) async fn commit_transition(
    conn: &libsql::Connection,
    observed: &Task,
    next: &Task,
    audit: TransitionAudit<'_>,
) -> Result<bool, DatabaseError> {
    let tx = conn.transaction().await?;
    if !write_guarded(&tx, observed, next).await? {
        tx.rollback().await?;
        return Ok(false);
    }
    let recorded = record_with(
        &tx,
        &observed.id,
        audit.actor,
        audit.action,
        Some(audit.detail),
        next.updated_at,
    )
    .await;
    if let Err(e) = recorded {
        tx.rollback().await?;
        return Err(e);
    }
    tx.commit().await?;
    Ok(true)
}

/// `task` back in the pool: pending, unclaimed, with the previous holder noted.
pub(crate) fn release_state(task: &Task, note: String, at: DateTime<Utc>) -> Task {
    let mut next = task.clone();
    next.status = TaskStatus::Pending;
    if let Some(claim) = next.claim.take() {
        next.metadata.released_from = Some(claim.claimed_by);
    }
    next.metadata.release_note = Some(note);
    next.released_at = Some(at);
    next.updated_at = at;
    next
}

fn claim_state(task: &Task, actor: &Actor, at: DateTime<Utc>) -> Task {
    let mut next = task.clone();
    next.status = TaskStatus::InProgress;
    next.claim = Some(Claim {
        claimed_by: actor.id.clone(),
        claimed_at: at,
    });
    next.updated_at = at;
    next
}

fn completion_state(task: &Task, actor: &Actor, notes: Option<&str>, at: DateTime<Utc>) -> Task {
    let mut next = task.clone();
    next.status = TaskStatus::Completed;
    next.claim = None;
    next.completed_at = Some(at);
    next.metadata.completed_by = Some(actor.id.clone());
    if let Some(notes) = notes {
        next.metadata.completion_notes = Some(notes.to_string());
    }
    next.updated_at = at;
    next
}

fn check_claimable(task: &Task, actor: &Actor) -> Result<(), CoreError> {
    if let Some(holder) = task.holder() {
        return Err(CoreError::AlreadyClaimed {
            id: task.id.clone(),
            holder: holder.to_string(),
        });
    }
    if !task.status.is_claimable() {
        return Err(CoreError::invalid_task_transition(
            &task.id,
            task.status,
            TaskStatus::InProgress,
        ));
    }
    if !task.assignee.admits(actor.kind) {
        return Err(CoreError::NotEligible {
            id: task.id.clone(),
            assignee: task.assignee.to_string(),
            kind: actor.kind.to_string(),
        });
    }
    Ok(())
}

fn check_transition(task: &Task, to: TaskStatus) -> Result<(), CoreError> {
    if task.status.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::invalid_task_transition(&task.id, task.status, to))
    }
}

impl CrewService {
    /// Holder-or-admin check for operations on a claimed task.
    fn check_holder(&self, task: &Task, actor: &Actor) -> Result<(), CoreError> {
        match task.holder() {
            Some(holder) if holder != actor.id && !self.is_admin(actor) => {
                Err(CoreError::NotClaimHolder {
                    id: task.id.clone(),
                    holder: holder.to_string(),
                    actor: actor.id.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// The error for a guarded write that changed nothing.
    async fn race_error(&self, task_id: &str, wanted: TaskStatus) -> DatabaseError {
        match self.get_task(task_id).await {
            Ok(current) => match current.holder() {
                Some(holder) if wanted == TaskStatus::InProgress => CoreError::AlreadyClaimed {
                    id: task_id.to_string(),
                    holder: holder.to_string(),
                }
                .into(),
                _ => CoreError::Conflict {
                    id: task_id.to_string(),
                    reason: format!("now {} before moving to {wanted}", current.status),
                }
                .into(),
            },
            Err(e) => e,
        }
    }

    /// Unclaimed `pending`/`released` tasks, in claim order.
    pub async fn claimable_tasks(&self) -> Result<Vec<Task>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM tasks
                     WHERE status IN ('pending', 'released') AND claimed_by IS NULL
                     ORDER BY {CLAIM_ORDER}"
                ),
                (),
            )
            .await?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }

    /// Claim a task by id: `pending|released → in_progress`.
    pub async fn claim_task(&self, actor: &Actor, task_id: &str) -> Result<Task, DatabaseError> {
        let task = self.get_task(task_id).await?;
        check_claimable(&task, actor)?;

        let now = now();
        let next = claim_state(&task, actor, now);
        let audit = TransitionAudit {
            actor: Some(&actor.id),
            action: AuditAction::Claimed,
            detail: detail(&ClaimedDetail {
                claimed_by: actor.id.clone(),
                from: task.status.to_string(),
            })?,
        };
        if !commit_transition(self.db().conn(), &task, &next, audit).await? {
            tracing::warn!(task = %task_id, actor = %actor.id, "claim lost a race");
            return Err(self.race_error(task_id, TaskStatus::InProgress).await);
        }
        tracing::info!(task = %task_id, actor = %actor.id, "task claimed");
        Ok(next)
    }

    /// Claim by title, preferring an available copy `actor` is eligible for.
    ///
    /// Without one, the first available copy (or the first copy) is tried so
    /// the error names the real obstacle.
    pub async fn claim_by_title(&self, actor: &Actor, title: &str) -> Result<Task, DatabaseError> {
        let tasks = self.tasks_by_title(title).await?;
        let task = tasks
            .iter()
            .find(|t| is_eligible(t, actor.kind))
            .or_else(|| tasks.iter().find(|t| t.is_available()))
            .or_else(|| tasks.first())
            .ok_or_else(|| CoreError::task_not_found(title))?;
        self.claim_task(actor, &task.id).await
    }

    /// Claim the first eligible task in claim order.
    ///
    /// A candidate taken by someone else between listing and claiming is
    /// skipped. Returns `None` when nothing eligible is left.
    pub async fn claim_next(&self, actor: &Actor) -> Result<Option<Task>, DatabaseError> {
        let mut candidates: Vec<Task> = self
            .claimable_tasks()
            .await?
            .into_iter()
            .filter(|t| is_eligible(t, actor.kind))
            .collect();
        sort_for_claim(&mut candidates);

        for candidate in candidates {
            match self.claim_task(actor, &candidate.id).await {
                Ok(task) => return Ok(Some(task)),
                Err(DatabaseError::Core(
                    e @ (CoreError::AlreadyClaimed { .. }
                    | CoreError::Conflict { .. }
                    | CoreError::InvalidTransition { .. }
                    | CoreError::NotFound { .. }),
                )) => {
                    tracing::debug!(task = %candidate.id, error = %e, "candidate taken, trying next");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Resolve a title to the copy `actor` holds, falling back to the first
    /// unfinished one.
    pub async fn find_task_held_by(&self, actor: &Actor, title: &str) -> Result<Task, DatabaseError> {
        let mut tasks = self.tasks_by_title(title).await?;
        if tasks.is_empty() {
            return Err(CoreError::task_not_found(title).into());
        }
        let idx = tasks
            .iter()
            .position(|t| t.holder() == Some(actor.id.as_str()))
            .or_else(|| tasks.iter().position(|t| !t.status.is_terminal()))
            .unwrap_or(0);
        Ok(tasks.swap_remove(idx))
    }

    /// Give a claim back: `in_progress → pending`. Holder or admin only.
    pub async fn unclaim_task(
        &self,
        actor: &Actor,
        task_id: &str,
        note: Option<&str>,
    ) -> Result<Task, DatabaseError> {
        let task = self.get_task(task_id).await?;
        if task.status != TaskStatus::InProgress {
            return Err(
                CoreError::invalid_task_transition(task_id, task.status, TaskStatus::Pending).into(),
            );
        }
        let claim = task.claim.clone().ok_or_else(|| {
            DatabaseError::InvalidState(format!("task {task_id} is in_progress without a claim"))
        })?;
        self.check_holder(&task, actor)?;

        let now = now();
        let note = note.map_or_else(|| format!("released by {}", actor.id), String::from);
        let next = release_state(&task, note.clone(), now);
        let audit = TransitionAudit {
            actor: Some(&actor.id),
            action: AuditAction::Unclaimed,
            detail: detail(&ReleasedDetail {
                previous_holder: claim.claimed_by.clone(),
                claimed_at: claim.claimed_at,
                from: task.status.to_string(),
                note,
            })?,
        };
        if !commit_transition(self.db().conn(), &task, &next, audit).await? {
            tracing::warn!(task = %task_id, actor = %actor.id, "unclaim lost a race");
            return Err(self.race_error(task_id, TaskStatus::Pending).await);
        }
        tracing::info!(task = %task_id, actor = %actor.id, previous = %claim.claimed_by, "task unclaimed");
        Ok(next)
    }

    /// Soft completion: `in_progress → review`, claim kept.
    pub async fn submit_for_review(
        &self,
        actor: &Actor,
        task_id: &str,
        notes: Option<&str>,
    ) -> Result<Task, DatabaseError> {
        let task = self.get_task(task_id).await?;
        check_transition(&task, TaskStatus::Review)?;
        self.check_holder(&task, actor)?;

        let now = now();
        let mut next = task.clone();
        next.status = TaskStatus::Review;
        if let Some(notes) = notes {
            next.metadata.completion_notes = Some(notes.to_string());
        }
        next.metadata.submitted_by = Some(actor.id.clone());
        next.metadata.submitted_at = Some(now);
        next.updated_at = now;

        let audit = TransitionAudit {
            actor: Some(&actor.id),
            action: AuditAction::Submitted,
            detail: detail(&CompletionDetail {
                from: task.status.to_string(),
                to: TaskStatus::Review.to_string(),
                notes: notes.map(String::from),
            })?,
        };
        if !commit_transition(self.db().conn(), &task, &next, audit).await? {
            tracing::warn!(task = %task_id, actor = %actor.id, "submit lost a race");
            return Err(self.race_error(task_id, TaskStatus::Review).await);
        }
        tracing::info!(task = %task_id, actor = %actor.id, "task submitted for review");
        Ok(next)
    }

    /// Direct completion from `pending`, `in_progress` or `review`. Clears the claim.
    pub async fn complete_task(
        &self,
        actor: &Actor,
        task_id: &str,
        notes: Option<&str>,
    ) -> Result<Task, DatabaseError> {
        let task = self.get_task(task_id).await?;
        check_transition(&task, TaskStatus::Completed)?;
        self.check_holder(&task, actor)?;

        let now = now();
        let next = completion_state(&task, actor, notes, now);
        let audit = TransitionAudit {
            actor: Some(&actor.id),
            action: AuditAction::Completed,
            detail: detail(&CompletionDetail {
                from: task.status.to_string(),
                to: TaskStatus::Completed.to_string(),
                notes: notes.map(String::from),
            })?,
        };
        if !commit_transition(self.db().conn(), &task, &next, audit).await? {
            tracing::warn!(task = %task_id, actor = %actor.id, "complete lost a race");
            return Err(self.race_error(task_id, TaskStatus::Completed).await);
        }
        tracing::info!(task = %task_id, actor = %actor.id, "task completed");
        Ok(next)
    }

    /// Admin status change along any allowed transition.
    ///
    /// Moving into `in_progress` claims the task for `actor` if unclaimed;
    /// moving to `pending` or `completed` clears the claim.
    pub async fn set_status(
        &self,
        actor: &Actor,
        task_id: &str,
        to: TaskStatus,
        reason: Option<&str>,
    ) -> Result<Task, DatabaseError> {
        self.require_admin(actor, "change task status")?;
        let task = self.get_task(task_id).await?;
        if task.status == to {
            return Ok(task);
        }
        check_transition(&task, to)?;

        let now = now();
        let next = match to {
            TaskStatus::InProgress if task.claim.is_none() => claim_state(&task, actor, now),
            TaskStatus::Completed => completion_state(&task, actor, reason, now),
            TaskStatus::Pending if task.claim.is_some() => {
                let note = reason.map_or_else(
                    || format!("status set to {to} by {}", actor.id),
                    String::from,
                );
                release_state(&task, note, now)
            }
            _ => {
                let mut next = task.clone();
                next.status = to;
                next.updated_at = now;
                next
            }
        };

        let audit = TransitionAudit {
            actor: Some(&actor.id),
            action: AuditAction::StatusChanged,
            detail: detail(&StatusChangedDetail {
                from: task.status.to_string(),
                to: to.to_string(),
                reason: reason.map(String::from),
            })?,
        };
        if !commit_transition(self.db().conn(), &task, &next, audit).await? {
            tracing::warn!(task = %task_id, actor = %actor.id, "status change lost a race");
            return Err(self.race_error(task_id, to).await);
        }
        tracing::info!(task = %task_id, actor = %actor.id, from = %task.status, to = %to, "status changed");
        Ok(next)
    }
}
