//! Host collaborator surface for devkit
//!
//! This crate provides:
//! - Traits for everything the plugin host owns (module registry,
//!   messaging client, per-module key-value storage, command dispatch)
//! - Chat/message identifiers and inline button markup
//! - An in-memory key-value store
//! - HTML escaping for message bodies

pub mod error;
pub mod host;
pub mod html;
pub mod markup;
pub mod memory;
pub mod module;

// Re-exports
pub use error::HostError;
pub use host::{ChatId, CommandDispatcher, Invocation, KvStore, KvStoreExt, MessageId, Messenger};
pub use html::escape_html;
pub use markup::{Button, Markup};
pub use memory::MemoryStore;
pub use module::{ModuleInfo, ModuleRegistry};

/// Result type for host operations
pub type Result<T> = std::result::Result<T, HostError>;
