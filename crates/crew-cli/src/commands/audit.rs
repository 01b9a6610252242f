use crew_core::enums::AuditAction;
use crew_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_opt_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `crew audit`, newest entries first.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = AuditFilter {
        task_id: args.task.clone(),
        action: parse_opt_enum::<AuditAction>(args.action.as_deref(), "action")?,
        actor: args.by.clone(),
        limit: Some(effective_limit(flags.limit, 50)),
    };

    let entries = ctx.service.query_audit(&filter).await?;
    output(&entries, flags.format)
}
