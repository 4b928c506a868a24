//! `dk run` - standalone host session
//!
//! Starts the debug watcher and the update poller, then reads console
//! commands from stdin until EOF or ctrl-c.

use crate::config::DevkitConfig;
use crate::context::Context;
use crate::dispatch::CommandTable;
use crate::host::{ConsoleMessenger, FsModuleRegistry};
use crate::logging::LogCapture;
use anyhow::{Context as _, Result};
use dk_core::{ChatId, CommandDispatcher, HostError, Invocation};
use owo_colors::OwoColorize;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use store::SledStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use updates::{GitRepo, NotifierConfig, UpdateNotifier};
use watcher::{prepare_debug_dir, DebugFiles, DebugSession, DebugWatcher};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Skip the update poller even if enabled in config
    pub no_updates: bool,
    /// Override `updates.repo_path`
    pub repo: Option<PathBuf>,
}

pub async fn run(config: DevkitConfig, capture: LogCapture, options: RunOptions) -> Result<()> {
    let debug_dir = config.watcher.debug_dir.clone();
    let extension = config.watcher.extension.clone();

    prepare_debug_dir(&debug_dir)
        .with_context(|| format!("Failed to prepare {}", debug_dir.display()))?;

    let store = Arc::new(
        SledStore::open(&config.host.store_path).context("Failed to open key-value store")?,
    );
    let messenger = Arc::new(ConsoleMessenger::new(config.host.outbox_dir.clone()));
    let registry = Arc::new(
        FsModuleRegistry::open(&config.host.modules_dir, extension.clone())
            .context("Failed to open modules directory")?,
    );

    let files = DebugFiles::new();
    let session = DebugSession::new(debug_dir.clone(), extension.clone(), registry.clone(), files.clone());
    let watcher = DebugWatcher::new(debug_dir, extension, registry, files)
        .with_interval(Duration::from_millis(config.watcher.interval_ms))
        .spawn();

    let repo = if config.updates.enabled && !options.no_updates {
        open_repo(&config, options.repo).await
    } else {
        info!("Update notifications disabled");
        None
    };

    let ctx = Arc::new(Context::new(config, messenger, store, session, capture, repo.clone()));
    let table = Arc::new(CommandTable::new(&ctx));

    if let Some(repo) = repo {
        let notifier = UpdateNotifier::new(
            Arc::new(repo),
            ctx.messenger.clone(),
            ctx.store.clone(),
            table.clone(),
            notifier_config(&ctx.config),
        );
        notifier.start();
        if ctx.notifier.set(notifier).is_err() {
            warn!("Update notifier was already running");
        }
    }

    print_banner(&ctx);
    let result = console(&ctx, &table).await;

    if let Some(notifier) = ctx.notifier() {
        notifier.unload();
    }
    watcher.abort();
    if let Err(e) = watcher.join().await {
        warn!("Debug watcher had stopped: {}", e);
    }

    info!("Session ended");
    result
}

async fn open_repo(config: &DevkitConfig, path: Option<PathBuf>) -> Option<GitRepo> {
    let path = path.unwrap_or_else(|| config.updates.repo_path.clone());

    match GitRepo::open(&path).await {
        Ok(repo) => {
            let repo = repo.with_remote(config.updates.remote.clone(), config.updates.branch.clone());
            info!("Watching {} for updates ({})", path.display(), repo.remote_ref());
            Some(repo)
        }
        Err(e) => {
            warn!("Update notifications disabled: {}", e);
            None
        }
    }
}

fn notifier_config(config: &DevkitConfig) -> NotifierConfig {
    let mut notifier = NotifierConfig::new(ChatId(config.host.owner_chat), config.updates.repo_url.clone());
    notifier.interval = Duration::from_secs(config.updates.interval_secs);
    notifier.ignored_interval = Duration::from_secs(config.updates.ignored_interval_secs);
    notifier.changelog_limit = config.updates.changelog_limit;
    notifier
}

fn print_banner(ctx: &Context) {
    let prefix = &ctx.config.host.prefix;
    println!("{}", "Devkit console".bold());
    println!(
        "{}: {}",
        "Debug directory".dimmed(),
        ctx.session.dir().display().to_string().cyan()
    );
    println!(
        "{}: {}",
        "Updates".dimmed(),
        if ctx.notifier().is_some() {
            "watching".green().to_string()
        } else {
            "off".yellow().to_string()
        }
    );
    println!("Type {} for commands, ctrl-c to quit\n", format!("{}help", prefix).cyan());
}

async fn console(ctx: &Context, table: &CommandTable) -> Result<()> {
    let chat = ChatId(ctx.config.host.owner_chat);
    let prefix = ctx.config.host.prefix.as_str();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Received ctrl-c, shutting down");
                return Ok(());
            }
        };

        let Some(line) = line else {
            info!("Console input closed");
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let Some(invocation) = Invocation::parse(&line, prefix, chat) else {
            println!("{}", format!("Commands start with '{}'. Try {}help", prefix, prefix).dimmed());
            continue;
        };

        let Some(result) = dispatch_until(table, invocation, tokio::signal::ctrl_c()).await else {
            info!("Received ctrl-c during a command, shutting down");
            return Ok(());
        };

        match result {
            Ok(()) => {}
            Err(HostError::UnknownCommand(name)) => {
                println!("{} Unknown command: {}", "✗".red(), name);
            }
            Err(e) => {
                error!("{}", e);
                println!("{} {}", "✗".red(), e);
            }
        }
    }
}

/// Run one command, giving up on it if `shutdown` completes first
async fn dispatch_until<F: Future>(
    table: &CommandTable,
    invocation: Invocation,
    shutdown: F,
) -> Option<dk_core::Result<()>> {
    tokio::select! {
        result = table.dispatch(invocation) => Some(result),
        _ = shutdown => None,
    }
}
