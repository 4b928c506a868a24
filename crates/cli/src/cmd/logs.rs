//! `logs <level> [force_insecure]` - dump captured logs as a file
//!
//! Levels use the numeric scale 0 (all) to 50 (critical). Anything below
//! warning may contain personal data and needs explicit confirmation.

use crate::context::Context;
use crate::redact;
use crate::util;
use anyhow::Result;
use dk_core::{Button, ChatId, Invocation, Markup};
use updates::Repository;

pub const LOGS_FILE_NAME: &str = "devkit-logs.txt";

/// Lowest level sent without confirmation
const SAFE_LEVEL: u32 = 30;

const FORCE_FLAG: &str = "force_insecure";

/// Button data prefixes handled by `press`
pub const ACTION_LEVEL: &str = "logs:";
pub const ACTION_FORCE: &str = "logs_force:";

/// Parse an integer or a level name
pub fn parse_verbosity(arg: &str) -> Option<u32> {
    if let Ok(level) = arg.parse::<u32>() {
        return Some(level);
    }

    match arg.to_ascii_lowercase().as_str() {
        "critical" | "fatal" => Some(50),
        "error" => Some(40),
        "warning" | "warn" => Some(30),
        "info" => Some(20),
        "debug" => Some(10),
        "notset" | "all" => Some(0),
        _ => None,
    }
}

/// Standard name of a level, or the number itself
pub fn level_name(level: u32) -> String {
    match level {
        50 => "CRITICAL".to_string(),
        40 => "ERROR".to_string(),
        30 => "WARNING".to_string(),
        20 => "INFO".to_string(),
        10 => "DEBUG".to_string(),
        0 => "NOTSET".to_string(),
        n => n.to_string(),
    }
}

fn chooser() -> Markup {
    Markup::row(vec![
        Button::new("🚨 Critical", format!("{}50", ACTION_LEVEL)),
        Button::new("🚫 Error", format!("{}40", ACTION_LEVEL)),
    ])
    .with_row(vec![
        Button::new("⚠️ Warning", format!("{}30", ACTION_LEVEL)),
        Button::new("ℹ️ Info", format!("{}20", ACTION_LEVEL)),
    ])
    .with_row(vec![
        Button::new("🧑‍💻 Debug", format!("{}10", ACTION_LEVEL)),
        Button::new("👁 All", format!("{}0", ACTION_LEVEL)),
    ])
    .with_row(vec![Button::new("🚫 Cancel", "cancel")])
}

pub async fn run(ctx: &Context, invocation: &Invocation) -> Result<()> {
    let Some(first) = invocation.words().next() else {
        ctx.prompt(invocation.chat, "💁‍♂️ <b>Choose log level</b>", &chooser())
            .await?;
        return Ok(());
    };

    let Some(level) = parse_verbosity(first) else {
        ctx.reply(invocation.chat, "🚫 <b>Please specify verbosity as an integer or string</b>")
            .await?;
        return Ok(());
    };

    let force = invocation.args.to_lowercase().contains(FORCE_FLAG);
    dump(ctx, invocation.chat, level, force).await
}

/// Send logs at or above `level`, asking first when the level is sensitive
pub async fn dump(ctx: &Context, chat: ChatId, level: u32, force: bool) -> Result<()> {
    let named = level_name(level);

    if level < SAFE_LEVEL && !force {
        let text = format!(
            "⚠️ <b>Log level </b><code>{0}</code><b> may reveal your confidential info, be careful</b>\n<b>Type </b><code>{1}logs {0} {2}</code><b> to ignore this warning</b>",
            named, ctx.config.host.prefix, FORCE_FLAG
        );
        let markup = Markup::row(vec![
            Button::new("📤 Send anyway", format!("{}{}", ACTION_FORCE, level)),
            Button::new("🚫 Cancel", "cancel"),
        ]);
        ctx.prompt(chat, &text, &markup).await?;
        return Ok(());
    }

    let lines = ctx.capture.dump(level);
    if lines.is_empty() {
        ctx.reply(chat, &format!("ℹ️ <b>You don't have any logs at verbosity {}.</b>", named))
            .await?;
        return Ok(());
    }

    let secrets = redact::collect_secrets(&ctx.config.logs.secrets, ctx.store.as_ref());
    let body = redact::redact(&lines.join("\n"), &secrets);

    let caption = caption(ctx, &named).await;
    ctx.messenger
        .send_file(chat, LOGS_FILE_NAME, body.as_bytes(), &caption)
        .await?;
    Ok(())
}

async fn caption(ctx: &Context, named: &str) -> String {
    let commit = match &ctx.repo {
        Some(repo) => repo.local_head().await.ok(),
        None => None,
    };
    let commit = commit
        .map(|hash| {
            let short: String = hash.chars().take(8).collect();
            format!(
                " <i><a href=\"{}/commit/{}\">({})</a></i>",
                ctx.config.updates.repo_url.trim_end_matches('/'),
                hash,
                short
            )
        })
        .unwrap_or_default();

    format!(
        "🌘 <b>Devkit logs with verbosity </b><code>{}</code>\n\n👩‍🎤 <b>Devkit version: {}</b>{}\n⏱ <b>Uptime: {}</b>\n<b>{}</b>",
        named,
        env!("CARGO_PKG_VERSION"),
        commit,
        util::format_uptime(util::uptime_since(ctx.started_at)),
        util::named_platform()
    )
}
