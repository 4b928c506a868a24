//! `suspend <seconds>` - stop handling commands for a while
//!
//! The console awaits each command before reading the next line, so sleeping
//! here holds the command loop. Watcher and poller tasks keep running.

use crate::context::Context;
use anyhow::Result;
use dk_core::Invocation;
use std::time::Duration;
use tracing::info;

/// Seconds to suspend, if the argument is a usable duration
pub fn parse_seconds(arg: &str) -> Option<f64> {
    arg.trim()
        .parse::<f64>()
        .ok()
        .filter(|s| *s >= 0.0 && Duration::try_from_secs_f64(*s).is_ok())
}

pub async fn run(ctx: &Context, invocation: &Invocation) -> Result<()> {
    let Some(seconds) = parse_seconds(&invocation.args) else {
        ctx.reply(invocation.chat, "🚫 <b>Invalid time to suspend</b>").await?;
        return Ok(());
    };

    ctx.reply(
        invocation.chat,
        &format!("🥶 <b>Bot suspended for</b> <code>{:?}</code> <b>seconds</b>", seconds),
    )
    .await?;

    info!("Suspending command handling for {}s", seconds);
    tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
    Ok(())
}
