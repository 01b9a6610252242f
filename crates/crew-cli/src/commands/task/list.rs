use crew_core::entities::Task;
use crew_core::enums::{Assignee, TaskPriority, TaskStatus};
use crew_db::repos::task::TaskFilter;

use crate::cli::GlobalFlags;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_opt_enum;
use crate::context::AppContext;
use crate::output::output;

pub struct ListFilters<'a> {
    pub status: Option<&'a str>,
    pub priority: Option<&'a str>,
    pub assignee: Option<&'a str>,
    pub claimed_by: Option<&'a str>,
    pub tag: Option<&'a str>,
    pub available: bool,
}

pub async fn run(
    filters: &ListFilters<'_>,
    search: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let limit = effective_limit(flags.limit, ctx.config.general.default_limit);
    let filter = build_filter(filters, limit)?;

    let tasks = match search {
        Some(query) => {
            // FTS ranks, so filter after fetching a wider window.
            let mut tasks = ctx
                .service
                .search_tasks(query, limit.saturating_mul(4))
                .await?;
            tasks.retain(|task| passes_filter(&filter, task));
            tasks.truncate(usize::try_from(limit)?);
            tasks
        }
        None => ctx.service.list_tasks(&filter).await?,
    };

    output(&tasks, flags.format)
}

fn build_filter(filters: &ListFilters<'_>, limit: u32) -> anyhow::Result<TaskFilter> {
    Ok(TaskFilter {
        status: parse_opt_enum::<TaskStatus>(filters.status, "status")?,
        priority: parse_opt_enum::<TaskPriority>(filters.priority, "priority")?,
        assignee: parse_opt_enum::<Assignee>(filters.assignee, "assignee")?,
        claimed_by: filters.claimed_by.map(String::from),
        tag: filters.tag.map(String::from),
        available: filters.available,
        limit: Some(limit),
    })
}

fn passes_filter(filter: &TaskFilter, task: &Task) -> bool {
    filter.status.is_none_or(|status| task.status == status)
        && filter.priority.is_none_or(|priority| task.priority == priority)
        && filter.assignee.is_none_or(|assignee| task.assignee == assignee)
        && filter
            .claimed_by
            .as_deref()
            .is_none_or(|holder| task.holder() == Some(holder))
        && filter.tag.as_ref().is_none_or(|tag| task.tags.contains(tag))
        && (!filter.available || task.is_available())
}
