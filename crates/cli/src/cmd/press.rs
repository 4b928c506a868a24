//! `press <action>` - press an inline button from the console

use crate::cmd::logs;
use crate::context::Context;
use anyhow::Result;
use dk_core::Invocation;
use tracing::{debug, warn};
use updates::{ActionOutcome, ACTION_IGNORE, ACTION_UPDATE};

const ACTION_CANCEL: &str = "cancel";

pub async fn run(ctx: &Context, invocation: &Invocation) -> Result<()> {
    let data = invocation.args.as_str();

    if data == ACTION_CANCEL {
        ctx.close_prompt().await;
        return Ok(());
    }

    if let Some(level) = data.strip_prefix(logs::ACTION_FORCE) {
        return press_logs(ctx, invocation, level, true).await;
    }
    if let Some(level) = data.strip_prefix(logs::ACTION_LEVEL) {
        return press_logs(ctx, invocation, level, false).await;
    }

    if data == ACTION_UPDATE || data == ACTION_IGNORE {
        let Some(notifier) = ctx.notifier() else {
            warn!("Ignoring {}: update notifications are disabled", data);
            return Ok(());
        };
        match notifier.handle_action(data).await? {
            ActionOutcome::Suppressed(commit) => debug!("Suppressed {:?}", commit),
            ActionOutcome::Updating => debug!("Update dispatched"),
            ActionOutcome::Unrecognized => {}
        }
        return Ok(());
    }

    debug!("No button with data {:?}", data);
    Ok(())
}

async fn press_logs(ctx: &Context, invocation: &Invocation, level: &str, force: bool) -> Result<()> {
    let Ok(level) = level.parse::<u32>() else {
        debug!("Malformed logs button {:?}", invocation.args);
        return Ok(());
    };

    ctx.close_prompt().await;
    logs::dump(ctx, invocation.chat, level, force).await
}
