use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Assignee, TaskPriority, TaskStatus};
use crate::errors::CoreError;

/// A unit of work shared between human and AI contributors.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assignee: Assignee,
    /// The actor currently holding the task, and since when.
    pub claim: Option<Claim>,
    pub completed_at: Option<DateTime<Utc>>,
    pub released_at: Option<DateTime<Utc>>,
    pub tags: BTreeSet<String>,
    pub metadata: TaskMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An actor's exclusive hold on a task.
///
/// Holder and timestamp only ever exist together.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Claim {
    pub claimed_by: String,
    pub claimed_at: DateTime<Utc>,
}

/// Free-form notes attached by lifecycle transitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct TaskMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_note: Option<String>,
    /// Holder of the claim that was released most recently.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released_from: Option<String>,
}

impl Task {
    /// The actor holding this task, if any.
    #[must_use]
    pub fn holder(&self) -> Option<&str> {
        self.claim.as_ref().map(|c| c.claimed_by.as_str())
    }

    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        self.claim.is_some()
    }

    /// Whether this task can be claimed right now.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.status.is_claimable() && self.claim.is_none()
    }

    /// Check the status/claim invariants.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` when an `in_progress` task has no claim
    /// or a `completed` task still carries one.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        if self.status.requires_claim() && self.claim.is_none() {
            return Err(CoreError::Validation(format!(
                "task {} is {} without a claim",
                self.id, self.status
            )));
        }
        if self.status.is_terminal() && self.claim.is_some() {
            return Err(CoreError::Validation(format!(
                "task {} is {} but still claimed",
                self.id, self.status
            )));
        }
        Ok(())
    }
}

/// Input for creating a task, from the CLI or a seed file.
///
/// Every field except `title` has a default, so seed files only need titles.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub assignee: Assignee,
    pub tags: BTreeSet<String>,
}

impl NewTask {
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the title is blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation("task title must not be empty".into()));
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(CoreError::Validation("tags must not be empty".into()));
        }
        Ok(())
    }
}
