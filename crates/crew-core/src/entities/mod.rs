//! Entity structs for Crew.

mod audit;
mod task;

pub use audit::AuditEntry;
pub use task::{Claim, NewTask, Task, TaskMetadata};
