//! Standalone host
//!
//! Lets the developer tools run without a chat client: messages are printed
//! to the terminal, uploads land in an outbox directory and modules are
//! plain source files in a directory.

pub mod console;
pub mod registry;

pub use console::{ConsoleMessenger, Posted};
pub use registry::FsModuleRegistry;
