//! Collaborator doubles for notifier tests

use crate::repo::{CommitSummary, Repository};
use crate::{Result, UpdateError};
use async_trait::async_trait;
use dk_core::{ChatId, CommandDispatcher, HostError, Invocation, Markup, MessageId, Messenger};
use parking_lot::Mutex;

/// Repository whose heads and log are set by the test
pub struct ScriptedRepository {
    local: Mutex<String>,
    remote: Mutex<String>,
    pending: Mutex<Vec<CommitSummary>>,
    failing_fetches: Mutex<usize>,
    fetches: Mutex<usize>,
}

impl ScriptedRepository {
    pub fn new(local: &str) -> Self {
        Self {
            local: Mutex::new(local.to_string()),
            remote: Mutex::new(local.to_string()),
            pending: Mutex::new(Vec::new()),
            failing_fetches: Mutex::new(0),
            fetches: Mutex::new(0),
        }
    }

    /// Put `messages` on the remote, newest last
    pub fn push_remote(&self, head: &str, messages: &[&str]) {
        *self.remote.lock() = head.to_string();
        let mut pending = self.pending.lock();
        for (i, message) in messages.iter().enumerate() {
            pending.insert(0, CommitSummary::new(format!("{}{}", &head[..4], i), *message));
        }
    }

    /// Local checkout catches up with the remote
    pub fn fast_forward(&self) {
        *self.local.lock() = self.remote.lock().clone();
        self.pending.lock().clear();
    }

    pub fn fail_next_fetches(&self, count: usize) {
        *self.failing_fetches.lock() = count;
    }

    /// Number of fetch calls so far, failed ones included
    pub fn fetches(&self) -> usize {
        *self.fetches.lock()
    }
}

#[async_trait]
impl Repository for ScriptedRepository {
    async fn local_head(&self) -> Result<String> {
        Ok(self.local.lock().clone())
    }

    async fn fetch(&self) -> Result<()> {
        *self.fetches.lock() += 1;
        let mut failing = self.failing_fetches.lock();
        if *failing > 0 {
            *failing -= 1;
            return Err(UpdateError::Git {
                command: "fetch".to_string(),
                stderr: "Could not resolve host".to_string(),
            });
        }
        Ok(())
    }

    async fn remote_head(&self) -> Result<String> {
        Ok(self.remote.lock().clone())
    }

    async fn pending_commits(&self) -> Result<Vec<CommitSummary>> {
        Ok(self.pending.lock().clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub chat: ChatId,
    pub id: MessageId,
    pub text: String,
    pub markup: Option<Markup>,
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    deleted: Mutex<Vec<MessageId>>,
    answers: Mutex<Vec<String>>,
    fail_deletes: Mutex<bool>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_deletes(&self) {
        *self.fail_deletes.lock() = true;
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    pub fn deleted(&self) -> Vec<MessageId> {
        self.deleted.lock().clone()
    }

    pub fn answers(&self) -> Vec<String> {
        self.answers.lock().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, chat: ChatId, text: &str, markup: Option<&Markup>) -> dk_core::Result<MessageId> {
        let mut sent = self.sent.lock();
        let id = MessageId(100 + sent.len() as i64);
        sent.push(Sent {
            chat,
            id,
            text: text.to_string(),
            markup: markup.cloned(),
        });
        Ok(id)
    }

    async fn edit_message(&self, _chat: ChatId, _message: MessageId, _text: &str) -> dk_core::Result<()> {
        Ok(())
    }

    async fn delete_message(&self, _chat: ChatId, message: MessageId) -> dk_core::Result<()> {
        if *self.fail_deletes.lock() {
            return Err(HostError::Messaging("message to delete not found".to_string()));
        }
        self.deleted.lock().push(message);
        Ok(())
    }

    async fn send_file(
        &self,
        chat: ChatId,
        file_name: &str,
        _contents: &[u8],
        caption: &str,
    ) -> dk_core::Result<MessageId> {
        self.send_message(chat, &format!("[{}] {}", file_name, caption), None).await
    }

    async fn answer_callback(&self, text: &str) -> dk_core::Result<()> {
        self.answers.lock().push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingDispatcher {
    invocations: Mutex<Vec<Invocation>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }
}

#[async_trait]
impl CommandDispatcher for RecordingDispatcher {
    async fn dispatch(&self, invocation: Invocation) -> dk_core::Result<()> {
        self.invocations.lock().push(invocation);
        Ok(())
    }
}
