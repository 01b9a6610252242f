//! Repository modules implementing Crew operations.
//!
//! Each module adds methods to `CrewService` via `impl CrewService` blocks.

pub mod audit;
pub mod lifecycle;
pub mod seed;
pub mod sweep;
pub mod task;
