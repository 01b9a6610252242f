//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `detail` JSON blob. These types
//! give the common shapes a schema.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Detail for `AuditAction::StatusChanged`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: String,
    pub to: String,
    pub reason: Option<String>,
}

/// Detail for `AuditAction::Claimed`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ClaimedDetail {
    pub claimed_by: String,
    pub from: String,
}

/// Detail for `AuditAction::Released` and `AuditAction::Unclaimed`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReleasedDetail {
    pub previous_holder: String,
    pub claimed_at: DateTime<Utc>,
    pub from: String,
    pub note: String,
}

/// Detail for `AuditAction::Submitted` and `AuditAction::Completed`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CompletionDetail {
    pub from: String,
    pub to: String,
    pub notes: Option<String>,
}
