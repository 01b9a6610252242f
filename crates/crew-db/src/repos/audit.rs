//! Audit trail repository.
//!
//! Append-only audit entries recording every task mutation. Supports dynamic
//! filtering.

use chrono::{DateTime, Utc};
use crew_core::entities::AuditEntry;
use crew_core::enums::AuditAction;
use crew_core::ids::PREFIX_AUDIT;
use serde::Serialize;

use crate::error::DatabaseError;
use crate::generate_id_with;
use crate::helpers::{
    format_datetime, get_opt_string, parse_datetime, parse_enum, parse_optional_json,
};
use crate::service::CrewService;

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub task_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actor: Option<String>,
    pub limit: Option<u32>,
}

/// Serialize a typed detail payload.
pub(crate) fn detail<T: Serialize>(value: &T) -> Result<serde_json::Value, DatabaseError> {
    serde_json::to_value(value).map_err(|e| DatabaseError::Other(e.into()))
}

/// Build and insert an audit entry on `conn` (which may be a transaction).
pub(crate) async fn record_with(
    conn: &libsql::Connection,
    task_id: &str,
    actor: Option<&str>,
    action: AuditAction,
    detail: Option<serde_json::Value>,
    at: DateTime<Utc>,
) -> Result<AuditEntry, DatabaseError> {
    let entry = AuditEntry {
        id: generate_id_with(conn, PREFIX_AUDIT).await?,
        task_id: task_id.to_string(),
        actor: actor.map(String::from),
        action,
        detail,
        created_at: at,
    };
    append_with(conn, &entry).await?;
    Ok(entry)
}

async fn append_with(conn: &libsql::Connection, entry: &AuditEntry) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO audit_trail (id, task_id, actor, action, detail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        libsql::params![
            entry.id.as_str(),
            entry.task_id.as_str(),
            entry.actor.as_deref(),
            entry.action.as_str(),
            entry
                .detail
                .as_ref()
                .map(std::string::ToString::to_string)
                .as_deref(),
            format_datetime(entry.created_at)
        ],
    )
    .await?;
    Ok(())
}

impl CrewService {
    /// Append an audit entry. Called by every mutation method.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        append_with(self.db().conn(), entry).await
    }

    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref task_id) = filter.task_id {
            params.push(libsql::Value::Text(task_id.clone()));
            conditions.push(format!("task_id = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(ref actor) = filter.actor {
            params.push(libsql::Value::Text(actor.clone()));
            conditions.push(format!("actor = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, task_id, actor, action, detail, created_at
             FROM audit_trail {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next().await? {
            entries.push(AuditEntry {
                id: row.get::<String>(0)?,
                task_id: row.get::<String>(1)?,
                actor: get_opt_string(&row, 2)?,
                action: parse_enum(&row.get::<String>(3)?)?,
                detail: parse_optional_json(get_opt_string(&row, 4)?.as_deref())?,
                created_at: parse_datetime(&row.get::<String>(5)?)?,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use crate::helpers::now;
    use crate::test_support::helpers::test_service;

    use super::*;

    #[tokio::test]
    async fn append_and_filter() {
        let svc = test_service().await;
        let at = now();
        let conn = svc.db().conn();
        record_with(conn, "tsk-1", Some("agent-1"), AuditAction::Claimed, None, at)
            .await
            .unwrap();
        record_with(
            conn,
            "tsk-1",
            None,
            AuditAction::Released,
            Some(serde_json::json!({"note": "stale"})),
            at,
        )
        .await
        .unwrap();
        record_with(conn, "tsk-2", Some("agent-2"), AuditAction::Claimed, None, at)
            .await
            .unwrap();

        let all = svc.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let for_task = svc
            .query_audit(&AuditFilter {
                task_id: Some("tsk-1".into()),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(for_task.len(), 2);
        assert_eq!(for_task[0].action, AuditAction::Released);
        assert_eq!(for_task[0].actor, None);
        assert_eq!(for_task[0].detail.as_ref().unwrap()["note"], "stale");

        let claims = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Claimed),
                actor: Some("agent-2".into()),
                limit: Some(10),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].task_id, "tsk-2");
    }
}
