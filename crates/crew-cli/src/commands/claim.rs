use crate::cli::GlobalFlags;
use crate::cli::root_commands::ClaimArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `crew claim`.
///
/// With neither a title nor `--id`, claims the next eligible task and prints
/// `null` when nothing is claimable.
pub async fn handle(args: &ClaimArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = ctx.require_actor()?;

    let claimed = match (args.title.as_deref(), args.id.as_deref()) {
        (Some(title), _) => Some(ctx.service.claim_by_title(actor, title).await?),
        (None, Some(id)) => Some(ctx.service.claim_task(actor, id).await?),
        (None, None) => {
            let next = ctx.service.claim_next(actor).await?;
            if next.is_none() {
                tracing::info!(actor = %actor.id, "no eligible task to claim");
            }
            next
        }
    };

    output(&claimed, flags.format)
}
