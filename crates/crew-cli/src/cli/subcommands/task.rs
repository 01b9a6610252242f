use clap::Subcommand;

/// Task entity commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TaskCommands {
    /// Create a task.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Update a task's descriptive fields.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        /// Replace all tags
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,
    },
    /// List tasks in claim order.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        claimed_by: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        /// Only tasks that can be claimed now
        #[arg(long)]
        available: bool,
        /// Full-text search over title and description
        #[arg(long)]
        search: Option<String>,
    },
    /// Get a task by ID.
    Get { id: String },
    /// Find tasks by exact title.
    Find { title: String },
    /// Delete a task (admin).
    Delete { id: String },
}
