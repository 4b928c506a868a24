//! State shared by console commands

use crate::config::DevkitConfig;
use crate::logging::LogCapture;
use chrono::{DateTime, Local};
use dk_core::{ChatId, KvStore, Markup, MessageId, Messenger};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use tracing::debug;
use updates::{GitRepo, UpdateNotifier};
use watcher::DebugSession;

pub struct Context {
    pub config: DevkitConfig,
    pub messenger: Arc<dyn Messenger>,
    pub store: Arc<dyn KvStore>,
    pub session: DebugSession,
    pub capture: LogCapture,
    /// Tracked checkout; `None` when updates are disabled or no repo was found
    pub repo: Option<GitRepo>,
    pub started_at: DateTime<Local>,
    /// Set once the poller is wired up
    pub notifier: OnceLock<Arc<UpdateNotifier>>,
    /// Open prompt (level chooser, confidential warning) awaiting a press
    prompt: Mutex<Option<(ChatId, MessageId)>>,
}

impl Context {
    pub fn new(
        config: DevkitConfig,
        messenger: Arc<dyn Messenger>,
        store: Arc<dyn KvStore>,
        session: DebugSession,
        capture: LogCapture,
        repo: Option<GitRepo>,
    ) -> Self {
        Self {
            config,
            messenger,
            store,
            session,
            capture,
            repo,
            started_at: Local::now(),
            notifier: OnceLock::new(),
            prompt: Mutex::new(None),
        }
    }

    pub fn notifier(&self) -> Option<&Arc<UpdateNotifier>> {
        self.notifier.get()
    }

    pub async fn reply(&self, chat: ChatId, text: &str) -> dk_core::Result<MessageId> {
        self.messenger.send_message(chat, text, None).await
    }

    /// Send a message with buttons and remember it as the open prompt
    pub async fn prompt(&self, chat: ChatId, text: &str, markup: &Markup) -> dk_core::Result<MessageId> {
        let id = self.messenger.send_message(chat, text, Some(markup)).await?;
        if let Some(previous) = self.prompt.lock().replace((chat, id)) {
            debug!("Prompt {} replaced by {}", previous.1, id);
        }
        Ok(id)
    }

    /// Delete the open prompt, if any
    pub async fn close_prompt(&self) {
        let Some((chat, id)) = self.prompt.lock().take() else {
            return;
        };
        if let Err(e) = self.messenger.delete_message(chat, id).await {
            debug!("Could not delete prompt {}: {}", id, e);
        }
    }
}
