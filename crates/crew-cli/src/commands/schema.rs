use crew_core::entities::{AuditEntry, NewTask, Task};
use crew_core::responses::{SeedReport, SweepReport};
use schemars::schema_for;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Handle `crew schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = match args.type_name.replace('_', "-").as_str() {
        "task" => schema_for!(Task),
        "new-task" => schema_for!(NewTask),
        "audit-entry" => schema_for!(AuditEntry),
        "sweep-report" => schema_for!(SweepReport),
        "seed-report" => schema_for!(SeedReport),
        other => anyhow::bail!(
            "unknown schema type '{other}' (expected task, new-task, audit-entry, sweep-report, seed-report)"
        ),
    };
    output(&schema, flags.format)
}
