use std::time::Duration;

use crew_config::CoordinationConfig;
use crew_core::lifecycle::format_delta;
use tokio::time::{MissedTickBehavior, interval};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::WatchArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `crew watch`: sweep on an interval until Ctrl-C.
///
/// A failed tick is logged and the loop keeps going. Only reports that
/// released or skipped something are printed.
pub async fn handle(args: &WatchArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let period = poll_period(args.interval_secs, &ctx.config.coordination)?;
    tracing::info!(
        interval_secs = period.as_secs(),
        threshold = %format_delta(ctx.service.policy().threshold()),
        dry_run = args.dry_run,
        "stale-claim watcher started"
    );

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut ticks = 0u64;
    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(error) = result {
                    tracing::warn!(%error, "failed to listen for Ctrl-C");
                }
                break;
            }
            _ = ticker.tick() => {
                ticks += 1;
                if let Err(error) = sweep_once(args.dry_run, ctx, flags).await {
                    tracing::error!(error = %format!("{error:#}"), tick = ticks, "sweep failed");
                }
            }
        }
    }

    tracing::info!(ticks, "stale-claim watcher stopped");
    Ok(())
}

async fn sweep_once(dry_run: bool, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.service.sync().await?;
    let report = ctx.service.release_stale_tasks(dry_run).await?;
    if !report.released.is_empty() || !report.skipped.is_empty() {
        output(&report, flags.format)?;
    }
    Ok(())
}

/// `--interval-secs` wins over `coordination.poll_interval_secs`.
fn poll_period(flag: Option<u64>, config: &CoordinationConfig) -> anyhow::Result<Duration> {
    match flag {
        Some(0) => anyhow::bail!("--interval-secs must be at least 1"),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Ok(config.poll_interval()?),
    }
}
