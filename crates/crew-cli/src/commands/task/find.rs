use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Every task with exactly this title, in claim order.
pub async fn run(title: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let tasks = ctx.service.tasks_by_title(title).await?;
    output(&tasks, flags.format)
}
