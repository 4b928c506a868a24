//! Command implementations
//!
//! `run` and `config` are `dk` subcommands; the rest are console commands
//! reached through [`crate::dispatch::CommandTable`].

pub mod config;
pub mod debugmod;
pub mod help;
pub mod logs;
pub mod ping;
pub mod press;
pub mod run;
pub mod suspend;
pub mod update;
