//! `help` - list console commands

use crate::context::Context;
use crate::dispatch::COMMANDS;
use anyhow::Result;
use dk_core::{escape_html, Invocation};

pub async fn run(ctx: &Context, invocation: &Invocation) -> Result<()> {
    let prefix = &ctx.config.host.prefix;
    let lines: Vec<String> = COMMANDS
        .iter()
        .map(|(name, usage)| format!("▫️ <code>{}{}</code> {}", prefix, name, escape_html(usage)))
        .collect();

    ctx.reply(invocation.chat, &format!("🧰 <b>Commands</b>\n\n{}", lines.join("\n")))
        .await?;
    Ok(())
}
