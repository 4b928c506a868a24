//! `update [--force]` - fast-forward the tracked checkout

use crate::context::Context;
use anyhow::Result;
use dk_core::{escape_html, Invocation};
use tracing::{info, warn};

pub async fn run(ctx: &Context, invocation: &Invocation) -> Result<()> {
    let Some(repo) = &ctx.repo else {
        ctx.reply(invocation.chat, "🚫 <b>No repository is tracked for updates</b>")
            .await?;
        return Ok(());
    };

    let status = ctx
        .reply(invocation.chat, "🔄 <b>Downloading updates...</b>")
        .await?;

    match repo.pull().await {
        Ok(output) => {
            info!("Pulled {} in {}", repo.remote_ref(), repo.root().display());
            let text = if output.is_empty() {
                "✅ <b>Updated</b>".to_string()
            } else {
                format!("✅ <b>Updated</b>\n<code>{}</code>", escape_html(&output))
            };
            ctx.messenger.edit_message(invocation.chat, status, &text).await?;
        }
        Err(e) => {
            warn!("Update failed: {}", e);
            ctx.messenger
                .edit_message(
                    invocation.chat,
                    status,
                    &format!("🚫 <b>Update failed</b>\n<code>{}</code>", escape_html(&e.to_string())),
                )
                .await?;
        }
    }

    Ok(())
}
