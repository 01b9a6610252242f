use crate::cli::GlobalFlags;
use crate::cli::root_commands::CompleteArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `crew complete`.
///
/// A title resolves to the caller's own claimed task of that name. Without
/// `--direct` the task goes to review and keeps its claim.
pub async fn handle(
    args: &CompleteArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let actor = ctx.require_actor()?;

    let task_id = match (args.title.as_deref(), args.id.as_deref()) {
        (Some(title), _) => ctx.service.find_task_held_by(actor, title).await?.id,
        (None, Some(id)) => id.to_string(),
        (None, None) => anyhow::bail!("pass a task title or --id"),
    };
    let notes = args.notes.as_deref().or(args.notes_flag.as_deref());

    let task = if args.direct {
        ctx.service.complete_task(actor, &task_id, notes).await?
    } else {
        ctx.service.submit_for_review(actor, &task_id, notes).await?
    };
    output(&task, flags.format)
}
