use crew_core::entities::NewTask;
use crew_core::enums::{Assignee, TaskPriority};

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::{parse_opt_enum, parse_tags};
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    title: &str,
    description: Option<&str>,
    priority: Option<&str>,
    assignee: Option<&str>,
    tags: &[String],
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let actor = ctx.require_actor()?;
    let draft = NewTask {
        title: title.to_string(),
        description: description.unwrap_or_default().to_string(),
        priority: parse_opt_enum::<TaskPriority>(priority, "priority")?.unwrap_or_default(),
        assignee: parse_opt_enum::<Assignee>(assignee, "assignee")?.unwrap_or_default(),
        tags: parse_tags(tags),
    };

    let task = ctx.service.create_task(actor, &draft).await?;
    output(&task, flags.format)
}
