//! `ping` - measure reply latency

use crate::context::Context;
use anyhow::Result;
use dk_core::Invocation;
use std::time::Instant;

const PLACEHOLDER: &str = "<code>🐻 Bear with us while ping is checking...</code>";

pub async fn run(ctx: &Context, invocation: &Invocation) -> Result<()> {
    let start = Instant::now();
    let message = ctx.reply(invocation.chat, PLACEHOLDER).await?;
    let ms = start.elapsed().as_secs_f64() * 1000.0;

    ctx.messenger
        .edit_message(invocation.chat, message, &format!("⏱ <b>Ping:</b> <code>{:.3}</code> <b>ms</b>", ms))
        .await?;
    Ok(())
}
