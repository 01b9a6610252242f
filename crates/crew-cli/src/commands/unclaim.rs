use crate::cli::GlobalFlags;
use crate::cli::root_commands::UnclaimArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `crew unclaim`.
pub async fn handle(
    args: &UnclaimArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let actor = ctx.require_actor()?;
    let task = ctx
        .service
        .unclaim_task(actor, &args.id, args.note.as_deref())
        .await?;
    output(&task, flags.format)
}
