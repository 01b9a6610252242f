//! Response types returned as JSON by `crew` commands.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::TaskStatus;

/// One task released by a stale sweep.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReleasedTask {
    pub id: String,
    pub title: String,
    pub from: TaskStatus,
    pub previous_holder: String,
    pub claimed_at: DateTime<Utc>,
}

/// Response from `crew sweep` (and each `crew watch` tick).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SweepReport {
    pub swept_at: DateTime<Utc>,
    /// Claimed tasks in a stale-eligible status that were examined.
    pub scanned: usize,
    pub released: Vec<ReleasedTask>,
    /// Stale tasks whose state changed between read and write; left alone.
    pub skipped: Vec<String>,
    pub dry_run: bool,
}

impl SweepReport {
    #[must_use]
    pub fn released_count(&self) -> usize {
        self.released.len()
    }
}

/// Response from `crew seed`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SeedReport {
    pub created: Vec<String>,
    /// Titles already present in the store, or repeated within the file.
    pub skipped: Vec<String>,
}
