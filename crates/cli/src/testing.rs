//! Test harness: a console host on temp directories

use crate::config::DevkitConfig;
use crate::context::Context;
use crate::dispatch::CommandTable;
use crate::host::{ConsoleMessenger, FsModuleRegistry, Posted};
use crate::logging::LogCapture;
use async_trait::async_trait;
use dk_core::{ChatId, CommandDispatcher, Invocation, MemoryStore};
use std::sync::Arc;
use tempfile::TempDir;
use updates::{CommitSummary, NotifierConfig, Repository, UpdateNotifier};
use watcher::{prepare_debug_dir, DebugFiles, DebugSession};

pub const OWNER: ChatId = ChatId(7);

pub struct Harness {
    pub ctx: Arc<Context>,
    pub messenger: Arc<ConsoleMessenger>,
    pub store: Arc<MemoryStore>,
    pub files: DebugFiles,
    pub table: Arc<CommandTable>,
    pub temp: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();

        let mut config = DevkitConfig::default();
        config.host.modules_dir = temp.path().join("modules");
        config.host.store_path = temp.path().join("db");
        config.host.outbox_dir = temp.path().join("outbox");
        config.host.owner_chat = OWNER.0;
        config.watcher.debug_dir = temp.path().join("debug_modules");
        config.updates.enabled = false;

        let registry = Arc::new(FsModuleRegistry::open(&config.host.modules_dir, "py").unwrap());
        std::fs::write(
            config.host.modules_dir.join("TestMod.py"),
            "# name: Tester\nclass TestMod: pass\n",
        )
        .unwrap();

        prepare_debug_dir(&config.watcher.debug_dir).unwrap();
        let files = DebugFiles::new();
        let session = DebugSession::new(config.watcher.debug_dir.clone(), "py", registry, files.clone());

        let messenger = Arc::new(ConsoleMessenger::new(config.host.outbox_dir.clone()).quiet());
        let store = Arc::new(MemoryStore::new());
        let ctx = Arc::new(Context::new(
            config,
            messenger.clone(),
            store.clone(),
            session,
            LogCapture::new(100),
            None,
        ));
        let table = Arc::new(CommandTable::new(&ctx));

        Self {
            ctx,
            messenger,
            store,
            files,
            table,
            temp,
        }
    }

    /// Dispatch one console line from the owner
    pub async fn run(&self, line: &str) -> dk_core::Result<()> {
        let invocation = Invocation::parse(line, ".", OWNER).unwrap();
        self.table.dispatch(invocation).await
    }

    pub fn last(&self) -> Posted {
        self.messenger.last_visible().unwrap()
    }

    /// Wire an update notifier whose remote is one commit ahead
    pub fn with_notifier(self) -> (Self, Arc<UpdateNotifier>) {
        let notifier = UpdateNotifier::new(
            Arc::new(AheadRepository),
            self.messenger.clone(),
            self.store.clone(),
            self.table.clone(),
            NotifierConfig::new(OWNER, "https://example.com/devkit"),
        );
        assert!(self.ctx.notifier.set(notifier.clone()).is_ok());
        (self, notifier)
    }
}

pub const LOCAL_HEAD: &str = "1111111111111111111111111111111111111111";
pub const REMOTE_HEAD: &str = "2222222222222222222222222222222222222222";

/// Checkout with a single pending commit
pub struct AheadRepository;

#[async_trait]
impl Repository for AheadRepository {
    async fn local_head(&self) -> updates::Result<String> {
        Ok(LOCAL_HEAD.to_string())
    }

    async fn fetch(&self) -> updates::Result<()> {
        Ok(())
    }

    async fn remote_head(&self) -> updates::Result<String> {
        Ok(REMOTE_HEAD.to_string())
    }

    async fn pending_commits(&self) -> updates::Result<Vec<CommitSummary>> {
        Ok(vec![CommitSummary::new("2222222", "Fix <things>")])
    }
}
