//! Console command table

use crate::cmd;
use crate::context::Context;
use async_trait::async_trait;
use dk_core::{CommandDispatcher, HostError, Invocation};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Command names with their usage line, in help order
pub const COMMANDS: &[(&str, &str)] = &[
    ("debugmod", "<module> - Open module for debugging, reloading on every edit"),
    ("logs", "<level> [force_insecure] - Dump logs. Levels below WARNING may contain personal info"),
    ("ping", "Measure reply latency"),
    ("suspend", "<seconds> - Stop handling commands for N seconds"),
    ("update", "[--force] - Pull the latest version of the tracked repository"),
    ("press", "<action> - Press a button on the latest prompt or notification"),
    ("help", "List commands"),
];

/// Routes invocations to `cmd::*` handlers.
///
/// Holds the context weakly: the context owns the update notifier, which
/// owns this table.
pub struct CommandTable {
    ctx: Weak<Context>,
}

impl CommandTable {
    pub fn new(ctx: &Arc<Context>) -> Self {
        Self {
            ctx: Arc::downgrade(ctx),
        }
    }
}

#[async_trait]
impl CommandDispatcher for CommandTable {
    async fn dispatch(&self, invocation: Invocation) -> dk_core::Result<()> {
        debug!("Dispatching {} {:?}", invocation.command, invocation.args);
        let Some(strong) = self.ctx.upgrade() else {
            return Err(HostError::Command {
                name: invocation.command,
                reason: "host is shutting down".to_string(),
            });
        };
        let ctx = strong.as_ref();

        let result = match invocation.command.as_str() {
            "debugmod" => cmd::debugmod::run(ctx, &invocation).await,
            "logs" => cmd::logs::run(ctx, &invocation).await,
            "ping" => cmd::ping::run(ctx, &invocation).await,
            "suspend" => cmd::suspend::run(ctx, &invocation).await,
            "update" => cmd::update::run(ctx, &invocation).await,
            "press" => cmd::press::run(ctx, &invocation).await,
            "help" => cmd::help::run(ctx, &invocation).await,
            _ => return Err(HostError::UnknownCommand(invocation.command)),
        };

        result.map_err(|e| HostError::Command {
            name: invocation.command.clone(),
            reason: format!("{:#}", e),
        })
    }
}
