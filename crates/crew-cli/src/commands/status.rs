use crew_core::enums::TaskStatus;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::StatusArgs;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `crew status` (admin).
pub async fn handle(args: &StatusArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = ctx.require_actor()?;
    let to = parse_enum::<TaskStatus>(&args.status, "status")?;
    let task = ctx
        .service
        .set_status(actor, &args.id, to, args.reason.as_deref())
        .await?;
    output(&task, flags.format)
}
