//! `dk config` - view and edit the configuration file

use crate::config::{self, KEYS};
use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;

/// Print every key grouped by section
pub async fn run_list(path: &Path) -> Result<()> {
    let config = config::load(path)?;

    println!("{}", "Devkit Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), path.display().dimmed());

    let mut section = "";
    for key in KEYS {
        let (head, name) = key.split_once('.').unwrap_or(("", key));
        if head != section {
            if !section.is_empty() {
                println!();
            }
            println!("{}", format!("[{}]", head).yellow());
            section = head;
        }
        println!("  {} = {}", name.cyan(), config.get(key)?);
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  watcher.interval_ms: 100-60,000");
    println!("  updates.interval_secs: 10-86,400");
    println!("  updates.ignored_interval_secs: >= updates.interval_secs");
    println!("  updates.changelog_limit: 1-100");
    println!("  logs.capacity: 100-1,000,000");

    Ok(())
}

pub async fn run_get(path: &Path, key: &str) -> Result<()> {
    let config = config::load(path)?;
    println!("{}", config.get(key)?);
    Ok(())
}

pub async fn run_set(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = config::load(path)?;
    config.set(key, value)?;
    config::save(path, &config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    println!("{}", "Note: restart `dk run` for changes to take effect".yellow());
    Ok(())
}

/// Show the config file path, creating the file on request
pub async fn run_path(path: &Path, create: bool) -> Result<()> {
    if create && config::init_if_missing(path)? {
        println!("{} Created config file at: {}", "✓".green(), path.display());
        return Ok(());
    }

    println!("{}", path.display());
    if !path.exists() {
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }
    Ok(())
}

pub async fn run_example() -> Result<()> {
    println!("{}", config::example_config());
    Ok(())
}
