//! Batched task seeding from TOML or JSON Lines files.
//!
//! TOML seed files hold an array of `[[task]]` tables; JSONL files hold one
//! task object per line. Only `title` is required. All inserts share one
//! transaction, and titles already on the board are skipped so re-seeding is
//! idempotent.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use crew_core::actor::Actor;
use crew_core::entities::NewTask;
use crew_core::errors::CoreError;
use crew_core::responses::SeedReport;
use serde::Deserialize;

use crate::error::DatabaseError;
use crate::repos::task::insert_task_with;
use crate::service::CrewService;

#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default, rename = "task")]
    tasks: Vec<NewTask>,
}

/// Parse a seed file, choosing the format by extension (`.toml`, `.jsonl`, `.ndjson`).
///
/// # Errors
///
/// Returns `DatabaseError::Other` if the file cannot be read or parsed, and
/// `CoreError::Validation` for an unknown extension.
pub fn read_seed_file(path: &Path) -> Result<Vec<NewTask>, DatabaseError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading seed file {}", path.display()))?;
            let file: SeedFile = toml::from_str(&text)
                .with_context(|| format!("parsing seed file {}", path.display()))?;
            Ok(file.tasks)
        }
        Some("jsonl" | "ndjson") => {
            let tasks = serde_jsonlines::json_lines::<NewTask, _>(path)
                .and_then(|lines| lines.collect::<std::io::Result<Vec<_>>>())
                .with_context(|| format!("parsing seed file {}", path.display()))?;
            Ok(tasks)
        }
        _ => Err(CoreError::Validation(format!(
            "seed file {} must end in .toml or .jsonl",
            path.display()
        ))
        .into()),
    }
}

async fn title_exists(conn: &libsql::Connection, title: &str) -> Result<bool, DatabaseError> {
    let mut rows = conn
        .query("SELECT 1 FROM tasks WHERE title = ?1 LIMIT 1", [title])
        .await?;
    Ok(rows.next().await?.is_some())
}

impl CrewService {
    /// Create every draft whose title is not on the board yet, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` before writing anything if a draft is
    /// invalid; any store error rolls the whole batch back.
    pub async fn seed_tasks(
        &self,
        actor: &Actor,
        drafts: &[NewTask],
    ) -> Result<SeedReport, DatabaseError> {
        for draft in drafts {
            draft.validate()?;
        }

        let tx = self.db().conn().transaction().await?;
        let mut seen = HashSet::new();
        let mut report = SeedReport {
            created: Vec::new(),
            skipped: Vec::new(),
        };

        for draft in drafts {
            let title = draft.title.trim();
            if !seen.insert(title.to_string()) || title_exists(&tx, title).await? {
                report.skipped.push(title.to_string());
                continue;
            }
            let task = insert_task_with(&tx, actor, draft).await?;
            report.created.push(task.id);
        }

        tx.commit().await?;
        tracing::info!(
            created = report.created.len(),
            skipped = report.skipped.len(),
            "seed finished"
        );
        Ok(report)
    }

    /// [`read_seed_file`] followed by [`CrewService::seed_tasks`].
    ///
    /// # Errors
    ///
    /// See both.
    pub async fn seed_from_file(
        &self,
        actor: &Actor,
        path: &Path,
    ) -> Result<SeedReport, DatabaseError> {
        let drafts = read_seed_file(path)?;
        self.seed_tasks(actor, &drafts).await
    }
}

#[cfg(test)]
mod tests {
    use crew_core::enums::{Assignee, TaskPriority};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::helpers::{test_actor, test_service};

    #[test]
    fn reads_toml_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.toml");
        std::fs::write(
            &path,
            r#"
[[task]]
title = "Meal plan generator"
priority = "urgent"
assignee = "ai_agent"
tags = ["nutrition"]

[[task]]
title = "Progress photos"
"#,
        )
        .unwrap();

        let drafts = read_seed_file(&path).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].priority, TaskPriority::Urgent);
        assert_eq!(drafts[0].assignee, Assignee::AiAgent);
        assert_eq!(drafts[1].priority, TaskPriority::Medium);
    }

    #[test]
    fn reads_jsonl_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.jsonl");
        std::fs::write(
            &path,
            "{\"title\":\"Rest timer\",\"priority\":\"high\"}\n{\"title\":\"Plate calculator\"}\n",
        )
        .unwrap();

        let drafts = read_seed_file(&path).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].priority, TaskPriority::High);
        assert_eq!(drafts[1].title, "Plate calculator");
    }

    #[test]
    fn unknown_extension_rejected() {
        let err = read_seed_file(Path::new("tasks.csv")).unwrap_err();
        assert!(matches!(err, DatabaseError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn duplicates_within_batch_are_skipped() {
        let svc = test_service().await;
        let drafts = vec![NewTask::titled("Same"), NewTask::titled("Same")];
        let report = svc.seed_tasks(&test_actor(), &drafts).await.unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.skipped, vec!["Same".to_string()]);
    }

    #[tokio::test]
    async fn invalid_draft_writes_nothing() {
        let svc = test_service().await;
        let drafts = vec![NewTask::titled("Valid"), NewTask::titled("")];
        assert!(svc.seed_tasks(&test_actor(), &drafts).await.is_err());
        assert!(svc.tasks_by_title("Valid").await.unwrap().is_empty());
    }
}
