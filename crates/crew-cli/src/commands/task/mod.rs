mod create;
mod delete;
mod find;
mod get;
mod list;
mod update;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TaskCommands;
use crate::context::AppContext;

/// Handle `crew task`.
pub async fn handle(
    action: &TaskCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        TaskCommands::Create {
            title,
            description,
            priority,
            assignee,
            tags,
        } => {
            create::run(
                title,
                description.as_deref(),
                priority.as_deref(),
                assignee.as_deref(),
                tags,
                ctx,
                flags,
            )
            .await
        }
        TaskCommands::Update {
            id,
            title,
            description,
            priority,
            assignee,
            tags,
        } => {
            update::run(
                id,
                title.as_deref(),
                description.as_deref(),
                priority.as_deref(),
                assignee.as_deref(),
                tags.as_deref(),
                ctx,
                flags,
            )
            .await
        }
        TaskCommands::List {
            status,
            priority,
            assignee,
            claimed_by,
            tag,
            available,
            search,
        } => {
            let filters = list::ListFilters {
                status: status.as_deref(),
                priority: priority.as_deref(),
                assignee: assignee.as_deref(),
                claimed_by: claimed_by.as_deref(),
                tag: tag.as_deref(),
                available: *available,
            };
            list::run(&filters, search.as_deref(), ctx, flags).await
        }
        TaskCommands::Get { id } => get::run(id, ctx, flags).await,
        TaskCommands::Find { title } => find::run(title, ctx, flags).await,
        TaskCommands::Delete { id } => delete::run(id, ctx, flags).await,
    }
}
