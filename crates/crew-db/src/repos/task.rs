//! Task repository: CRUD, title lookup, filtered listing, and FTS.
//!
//! Status and claim columns are only written by the coordination repos
//! (`claim`, `sweep`); this module creates, edits, reads and deletes.

use crew_core::actor::Actor;
use crew_core::entities::{NewTask, Task, TaskMetadata};
use crew_core::enums::{Assignee, AuditAction, TaskPriority, TaskStatus};
use crew_core::errors::CoreError;
use crew_core::ids::PREFIX_TASK;

use crate::error::DatabaseError;
use crate::generate_id_with;
use crate::helpers::{
    format_datetime, get_opt_string, now, parse_claim, parse_datetime, parse_enum,
    parse_metadata, parse_optional_datetime, parse_tags, to_json_text,
};
use crate::repos::audit::{detail, record_with};
use crate::service::CrewService;
use crate::updates::task::TaskUpdate;

pub(crate) const SELECT_COLS: &str = "id, title, description, priority, status, assignee, \
     claimed_by, claimed_at, completed_at, released_at, tags, metadata, created_at, updated_at";

/// SQL rendering of `crew_core::lifecycle::claim_order`.
pub(crate) const CLAIM_ORDER: &str = "CASE priority WHEN 'urgent' THEN 0 WHEN 'high' THEN 1 \
     WHEN 'medium' THEN 2 ELSE 3 END, created_at DESC, id";

pub(crate) fn row_to_task(row: &libsql::Row) -> Result<Task, DatabaseError> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: get_opt_string(row, 2)?.unwrap_or_default(),
        priority: parse_enum(&row.get::<String>(3)?)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        assignee: parse_enum(&row.get::<String>(5)?)?,
        claim: parse_claim(get_opt_string(row, 6)?, get_opt_string(row, 7)?.as_deref())?,
        completed_at: parse_optional_datetime(get_opt_string(row, 8)?.as_deref())?,
        released_at: parse_optional_datetime(get_opt_string(row, 9)?.as_deref())?,
        tags: parse_tags(&row.get::<String>(10)?)?,
        metadata: parse_metadata(&row.get::<String>(11)?)?,
        created_at: parse_datetime(&row.get::<String>(12)?)?,
        updated_at: parse_datetime(&row.get::<String>(13)?)?,
    })
}

/// Filter criteria for task listing. Results come back in claim order.
#[derive(Debug, Default, Clone)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee: Option<Assignee>,
    pub claimed_by: Option<String>,
    pub tag: Option<String>,
    /// Only unclaimed `pending`/`released` tasks.
    pub available: bool,
    pub limit: Option<u32>,
}

/// Insert a new pending task on `conn` and audit its creation.
pub(crate) async fn insert_task_with(
    conn: &libsql::Connection,
    actor: &Actor,
    draft: &NewTask,
) -> Result<Task, DatabaseError> {
    draft.validate()?;
    let now = now();
    let id = generate_id_with(conn, PREFIX_TASK).await?;
    let task = Task {
        id: id.clone(),
        title: draft.title.trim().to_string(),
        description: draft.description.clone(),
        priority: draft.priority,
        status: TaskStatus::Pending,
        assignee: draft.assignee,
        claim: None,
        completed_at: None,
        released_at: None,
        tags: draft.tags.clone(),
        metadata: TaskMetadata::default(),
        created_at: now,
        updated_at: now,
    };

    conn.execute(
        "INSERT INTO tasks (id, title, description, priority, status, assignee, tags, metadata, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        libsql::params![
            id.as_str(),
            task.title.as_str(),
            task.description.as_str(),
            task.priority.as_str(),
            task.status.as_str(),
            task.assignee.as_str(),
            to_json_text(&task.tags)?,
            to_json_text(&task.metadata)?,
            format_datetime(now),
            format_datetime(now)
        ],
    )
    .await?;

    record_with(
        conn,
        &id,
        Some(&actor.id),
        AuditAction::Created,
        Some(detail(draft)?),
        now,
    )
    .await?;

    Ok(task)
}

impl CrewService {
    pub async fn create_task(&self, actor: &Actor, draft: &NewTask) -> Result<Task, DatabaseError> {
        let task = insert_task_with(self.db().conn(), actor, draft).await?;
        tracing::debug!(task = %task.id, title = %task.title, "task created");
        Ok(task)
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM tasks WHERE id = ?1"), [id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| CoreError::task_not_found(id))?;
        row_to_task(&row)
    }

    /// All tasks with exactly this title, in claim order.
    pub async fn tasks_by_title(&self, title: &str) -> Result<Vec<Task>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM tasks WHERE title = ?1 ORDER BY {CLAIM_ORDER}"),
                [title.trim()],
            )
            .await?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }

    /// Resolve a title to one task, preferring one that is still available.
    pub async fn find_task_by_title(&self, title: &str) -> Result<Task, DatabaseError> {
        let mut tasks = self.tasks_by_title(title).await?;
        if tasks.is_empty() {
            return Err(CoreError::task_not_found(title).into());
        }
        let idx = tasks.iter().position(Task::is_available).unwrap_or(0);
        Ok(tasks.swap_remove(idx))
    }

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(status) = filter.status {
            params.push(status.as_str().into());
            conditions.push(format!("status = ?{}", params.len()));
        }
        if let Some(priority) = filter.priority {
            params.push(priority.as_str().into());
            conditions.push(format!("priority = ?{}", params.len()));
        }
        if let Some(assignee) = filter.assignee {
            params.push(assignee.as_str().into());
            conditions.push(format!("assignee = ?{}", params.len()));
        }
        if let Some(ref claimed_by) = filter.claimed_by {
            params.push(claimed_by.clone().into());
            conditions.push(format!("claimed_by = ?{}", params.len()));
        }
        if let Some(ref tag) = filter.tag {
            params.push(tag.clone().into());
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM json_each(tasks.tags) WHERE json_each.value = ?{})",
                params.len()
            ));
        }
        if filter.available {
            conditions.push("status IN ('pending', 'released') AND claimed_by IS NULL".into());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM tasks {where_clause} ORDER BY {CLAIM_ORDER} LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }

    /// FTS5 search over title and description, best match first.
    pub async fn search_tasks(&self, query: &str, limit: u32) -> Result<Vec<Task>, DatabaseError> {
        let cols = SELECT_COLS
            .split(", ")
            .map(|c| format!("t.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {cols} FROM tasks_fts
                     JOIN tasks t ON t.rowid = tasks_fts.rowid
                     WHERE tasks_fts MATCH ?1
                     ORDER BY rank LIMIT ?2"
                ),
                libsql::params![query, limit],
            )
            .await?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }

    pub async fn update_task(
        &self,
        actor: &Actor,
        task_id: &str,
        update: TaskUpdate,
    ) -> Result<Task, DatabaseError> {
        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;

        if let Some(ref title) = update.title {
            if title.trim().is_empty() {
                return Err(CoreError::Validation("task title must not be empty".into()).into());
            }
            sets.push(format!("title = ?{idx}"));
            params.push(title.trim().to_string().into());
            idx += 1;
        }
        if let Some(ref description) = update.description {
            sets.push(format!("description = ?{idx}"));
            params.push(description.clone().into());
            idx += 1;
        }
        if let Some(priority) = update.priority {
            sets.push(format!("priority = ?{idx}"));
            params.push(priority.as_str().into());
            idx += 1;
        }
        if let Some(assignee) = update.assignee {
            sets.push(format!("assignee = ?{idx}"));
            params.push(assignee.as_str().into());
            idx += 1;
        }
        if let Some(ref tags) = update.tags {
            sets.push(format!("tags = ?{idx}"));
            params.push(to_json_text(tags)?.into());
            idx += 1;
        }

        if sets.is_empty() {
            return self.get_task(task_id).await;
        }

        let now = now();
        sets.push(format!("updated_at = ?{idx}"));
        params.push(format_datetime(now).into());
        idx += 1;

        params.push(task_id.into());
        let sql = format!("UPDATE tasks SET {} WHERE id = ?{idx}", sets.join(", "));
        let tx = self.db().conn().transaction().await?;
        let changed = tx.execute(&sql, libsql::params_from_iter(params)).await?;
        if changed == 0 {
            return Err(CoreError::task_not_found(task_id).into());
        }
        record_with(
            &tx,
            task_id,
            Some(&actor.id),
            AuditAction::Updated,
            Some(detail(&update)?),
            now,
        )
        .await?;
        tx.commit().await?;

        self.get_task(task_id).await
    }

    /// Delete a task. Admin only.
    pub async fn delete_task(&self, actor: &Actor, task_id: &str) -> Result<(), DatabaseError> {
        self.require_admin(actor, "delete tasks")?;
        let task = self.get_task(task_id).await?;

        let tx = self.db().conn().transaction().await?;
        tx.execute("DELETE FROM tasks WHERE id = ?1", [task_id])
            .await?;
        record_with(
            &tx,
            task_id,
            Some(&actor.id),
            AuditAction::Deleted,
            Some(serde_json::json!({ "title": task.title, "status": task.status })),
            now(),
        )
        .await?;
        tx.commit().await?;
        tracing::info!(task = %task_id, actor = %actor.id, "task deleted");
        Ok(())
    }
}
