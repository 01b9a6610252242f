use clap::{Args, Subcommand};

use crate::cli::subcommands::TaskCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Initialize crew for a project.
    Init(InitArgs),
    /// Task CRUD and lookup.
    Task {
        #[command(subcommand)]
        action: TaskCommands,
    },
    /// Claim a task by title, by id, or the next eligible one.
    Claim(ClaimArgs),
    /// Give back a claim held by you (or anyone, as admin).
    Unclaim(UnclaimArgs),
    /// Submit a claimed task for review, or complete it with --direct.
    Complete(CompleteArgs),
    /// Admin: move a task to another status.
    Status(StatusArgs),
    /// Release stale claims once.
    Sweep(SweepArgs),
    /// Release stale claims on an interval until interrupted.
    Watch(WatchArgs),
    /// Create tasks from a TOML or JSONL file, skipping existing titles.
    Seed(SeedArgs),
    /// Query the audit trail.
    Audit(AuditArgs),
    /// Print the JSON Schema of a response type.
    Schema(SchemaArgs),
}

/// Arguments for `crew init`.
#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing .crew/config.toml with defaults
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `crew claim`.
#[derive(Clone, Debug, Args)]
pub struct ClaimArgs {
    /// Title of the task to claim
    #[arg(conflicts_with_all = ["id", "next"])]
    pub title: Option<String>,
    /// Id of the task to claim
    #[arg(long, conflicts_with = "next")]
    pub id: Option<String>,
    /// Claim the highest-priority eligible task (the default without title or id)
    #[arg(long)]
    pub next: bool,
}

/// Arguments for `crew unclaim`.
#[derive(Clone, Debug, Args)]
pub struct UnclaimArgs {
    pub id: String,
    #[arg(long)]
    pub note: Option<String>,
}

/// Arguments for `crew complete`.
#[derive(Clone, Debug, Args)]
pub struct CompleteArgs {
    /// Title of the task
    #[arg(conflicts_with = "id")]
    pub title: Option<String>,
    /// Completion notes
    pub notes: Option<String>,
    /// Id of the task
    #[arg(long)]
    pub id: Option<String>,
    /// Completion notes (when addressing the task by --id)
    #[arg(short = 'm', long = "notes", conflicts_with = "notes")]
    pub notes_flag: Option<String>,
    /// Complete directly instead of submitting for review
    #[arg(long)]
    pub direct: bool,
}

/// Arguments for `crew status`.
#[derive(Clone, Debug, Args)]
pub struct StatusArgs {
    pub id: String,
    /// pending, in-progress, review, completed
    pub status: String,
    #[arg(long)]
    pub reason: Option<String>,
}

/// Arguments for `crew sweep`.
#[derive(Clone, Debug, Args)]
pub struct SweepArgs {
    /// Report what would be released without writing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `crew watch`.
#[derive(Clone, Debug, Args)]
pub struct WatchArgs {
    /// Seconds between sweeps (defaults to coordination.poll_interval_secs)
    #[arg(long)]
    pub interval_secs: Option<u64>,
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `crew seed`.
#[derive(Clone, Debug, Args)]
pub struct SeedArgs {
    /// Path to a .toml ([[task]] tables) or .jsonl file
    pub file: String,
}

/// Arguments for `crew audit`.
#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub task: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    /// Only entries recorded by this actor
    #[arg(long)]
    pub by: Option<String>,
}

/// Arguments for `crew schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// task, new-task, audit-entry, sweep-report, seed-report
    #[arg(default_value = "task")]
    pub type_name: String,
}
