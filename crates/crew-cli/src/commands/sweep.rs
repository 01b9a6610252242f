use crate::cli::GlobalFlags;
use crate::cli::root_commands::SweepArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `crew sweep`: one stale-claim release pass.
pub async fn handle(args: &SweepArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = ctx.service.release_stale_tasks(args.dry_run).await?;
    output(&report, flags.format)
}
