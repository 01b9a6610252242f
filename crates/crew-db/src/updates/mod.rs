//! Update builder types for task mutations.
//!
//! The builder produces an update struct with `Option` fields. Only `Some` fields
//! generate SET clauses in the dynamic UPDATE SQL. The update is serialized
//! as the audit `detail` payload (changed fields only).

pub mod task;
