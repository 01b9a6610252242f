use std::path::Path;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SeedArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `crew seed`.
pub async fn handle(args: &SeedArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = ctx.require_actor()?;
    let path = Path::new(&args.file);
    if !path.is_file() {
        anyhow::bail!("seed file '{}' does not exist", path.display());
    }
    let report = ctx.service.seed_from_file(actor, path).await?;
    output(&report, flags.format)
}
