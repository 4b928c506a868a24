//! Devkit command line host
//!
//! Runs the debug-reload watcher and the update notifier outside a chat
//! client, with developer commands on a terminal console.

pub mod cmd;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod host;
pub mod logging;
pub mod redact;
pub mod util;

#[cfg(test)]
mod testing;

pub use config::DevkitConfig;
pub use context::Context;
pub use dispatch::CommandTable;
