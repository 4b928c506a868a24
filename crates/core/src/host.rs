//! Messaging, storage and dispatch traits implemented by the host

use crate::markup::Markup;
use crate::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chat (or user) a message is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

/// Message identifier, unique within a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Client messaging primitives
///
/// Message bodies are HTML-formatted.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a message, optionally with inline buttons
    async fn send_message(&self, chat: ChatId, text: &str, markup: Option<&Markup>) -> Result<MessageId>;

    /// Replace the text of an existing message
    async fn edit_message(&self, chat: ChatId, message: MessageId, text: &str) -> Result<()>;

    /// Delete a message
    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<()>;

    /// Upload a file with a caption
    async fn send_file(
        &self,
        chat: ChatId,
        file_name: &str,
        contents: &[u8],
        caption: &str,
    ) -> Result<MessageId>;

    /// Acknowledge an inline button press
    async fn answer_callback(&self, text: &str) -> Result<()>;
}

/// Per-module persisted key-value storage
///
/// Values are stored as JSON. Implementations must be callable from several
/// tasks at once.
pub trait KvStore: Send + Sync {
    fn get(&self, owner: &str, key: &str) -> Option<serde_json::Value>;

    fn set(&self, owner: &str, key: &str, value: serde_json::Value) -> Result<()>;
}

/// Typed access on top of [`KvStore`]
pub trait KvStoreExt {
    /// Read and deserialize a value. `None` when missing, null or malformed.
    fn get_as<T: DeserializeOwned>(&self, owner: &str, key: &str) -> Option<T>;

    fn set_as<T: Serialize>(&self, owner: &str, key: &str, value: &T) -> Result<()>;
}

impl<S: KvStore + ?Sized> KvStoreExt for S {
    fn get_as<T: DeserializeOwned>(&self, owner: &str, key: &str) -> Option<T> {
        let value = self.get(owner, key)?;
        if value.is_null() {
            return None;
        }
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Ignoring malformed value for {}/{}: {}", owner, key, e);
                None
            }
        }
    }

    fn set_as<T: Serialize>(&self, owner: &str, key: &str, value: &T) -> Result<()> {
        self.set(owner, key, serde_json::to_value(value)?)
    }
}

/// A command invocation as seen by the dispatch table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Command name without prefix, lowercased
    pub command: String,
    /// Raw argument string (trimmed)
    pub args: String,
    /// Chat the command was issued in
    pub chat: ChatId,
}

impl Invocation {
    pub fn new(command: impl Into<String>, args: impl Into<String>, chat: ChatId) -> Self {
        Self {
            command: command.into().to_lowercase(),
            args: args.into().trim().to_string(),
            chat,
        }
    }

    /// Parse a raw line such as `.update --force`
    ///
    /// Returns `None` when the line does not start with `prefix` or names no
    /// command.
    pub fn parse(line: &str, prefix: &str, chat: ChatId) -> Option<Self> {
        let rest = line.trim().strip_prefix(prefix)?;
        let (command, args) = match rest.split_once(char::is_whitespace) {
            Some((command, args)) => (command, args),
            None => (rest, ""),
        };

        if command.is_empty() {
            return None;
        }

        Some(Self::new(command, args, chat))
    }

    /// Argument words
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.args.split_whitespace()
    }
}

/// Host command dispatch table
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    async fn dispatch(&self, invocation: Invocation) -> Result<()>;
}
