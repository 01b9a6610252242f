use crew_core::enums::{Assignee, TaskPriority};
use crew_db::updates::task::TaskUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::{parse_enum, parse_tags};
use crate::context::AppContext;
use crate::output::output;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    id: &str,
    title: Option<&str>,
    description: Option<&str>,
    priority: Option<&str>,
    assignee: Option<&str>,
    tags: Option<&[String]>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let actor = ctx.require_actor()?;

    let mut builder = TaskUpdateBuilder::new();
    if let Some(title) = title {
        builder = builder.title(title);
    }
    if let Some(description) = description {
        builder = builder.description(description);
    }
    if let Some(priority) = priority {
        builder = builder.priority(parse_enum::<TaskPriority>(priority, "priority")?);
    }
    if let Some(assignee) = assignee {
        builder = builder.assignee(parse_enum::<Assignee>(assignee, "assignee")?);
    }
    if let Some(tags) = tags {
        builder = builder.tags(parse_tags(tags));
    }

    let update = builder.build();
    if update.is_empty() {
        anyhow::bail!(
            "At least one of --title, --description, --priority, --assignee, or --tag must be provided"
        );
    }

    let task = ctx.service.update_task(actor, id, update).await?;
    output(&task, flags.format)
}
