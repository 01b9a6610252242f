//! ID prefixes for store-assigned identifiers.
//!
//! IDs take the form `{prefix}-{8 hex chars}`, e.g. `tsk-a3f8b2c1`.

pub const PREFIX_TASK: &str = "tsk";
pub const PREFIX_AUDIT: &str = "aud";

pub const ALL_PREFIXES: &[&str] = &[PREFIX_TASK, PREFIX_AUDIT];
