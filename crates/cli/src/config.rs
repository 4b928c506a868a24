//! System configuration (`config.toml`)
//!
//! Missing file means defaults. Every load is validated.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DevkitConfig {
    pub host: HostConfig,
    pub watcher: WatcherConfig,
    pub updates: UpdatesConfig,
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Plugin sources loaded by the standalone host
    pub modules_dir: PathBuf,
    /// sled key-value store directory
    pub store_path: PathBuf,
    /// Where uploaded files (log dumps) are written
    pub outbox_dir: PathBuf,
    /// Command prefix on the console
    pub prefix: String,
    /// Chat id of the owner; notifications go here
    pub owner_chat: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// Debug snapshot directory (emptied at startup)
    pub debug_dir: PathBuf,
    pub interval_ms: u64,
    /// Snapshot file extension
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatesConfig {
    pub enabled: bool,
    /// Checkout to watch for updates
    pub repo_path: PathBuf,
    pub remote: String,
    pub branch: String,
    /// Web URL used for compare links
    pub repo_url: String,
    pub interval_secs: u64,
    pub ignored_interval_secs: u64,
    pub changelog_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    /// Default stderr filter when `RUST_LOG` is unset
    pub level: String,
    /// Lines kept in memory for `logs`
    pub capacity: usize,
    /// Optional daily-rolling log file
    pub file: Option<PathBuf>,
    /// Extra strings masked in log dumps
    pub secrets: Vec<String>,
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("devkit"))
        .unwrap_or_else(|| PathBuf::from(".devkit"))
}

impl Default for HostConfig {
    fn default() -> Self {
        let data = data_dir();
        Self {
            modules_dir: data.join("modules"),
            store_path: data.join("db"),
            outbox_dir: data.join("outbox"),
            prefix: ".".to_string(),
            owner_chat: 0,
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debug_dir: data_dir().join("debug_modules"),
            interval_ms: 1000,
            extension: watcher::DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl Default for UpdatesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            repo_path: PathBuf::from("."),
            remote: "origin".to_string(),
            branch: "master".to_string(),
            repo_url: "https://github.com/yourusername/devkit".to_string(),
            interval_secs: 60,
            ignored_interval_secs: 120,
            changelog_limit: updates::CHANGELOG_LIMIT,
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            capacity: 5000,
            file: None,
            secrets: Vec::new(),
        }
    }
}

/// Settable keys, in display order
pub const KEYS: &[&str] = &[
    "host.prefix",
    "host.owner_chat",
    "host.modules_dir",
    "host.store_path",
    "host.outbox_dir",
    "watcher.debug_dir",
    "watcher.interval_ms",
    "watcher.extension",
    "updates.enabled",
    "updates.repo_path",
    "updates.remote",
    "updates.branch",
    "updates.repo_url",
    "updates.interval_secs",
    "updates.ignored_interval_secs",
    "updates.changelog_limit",
    "logs.level",
    "logs.capacity",
];

impl DevkitConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.host.prefix.is_empty() || self.host.prefix.chars().any(char::is_whitespace) {
            anyhow::bail!("host.prefix must be non-empty and contain no whitespace");
        }

        if !(100..=60_000).contains(&self.watcher.interval_ms) {
            anyhow::bail!(
                "watcher.interval_ms must be between 100 and 60000 (got {})",
                self.watcher.interval_ms
            );
        }

        if self.watcher.extension.is_empty()
            || !self.watcher.extension.chars().all(|c| c.is_ascii_alphanumeric())
        {
            anyhow::bail!("watcher.extension must be alphanumeric (got {:?})", self.watcher.extension);
        }

        if !(10..=86_400).contains(&self.updates.interval_secs) {
            anyhow::bail!(
                "updates.interval_secs must be between 10 and 86400 (got {})",
                self.updates.interval_secs
            );
        }

        if self.updates.ignored_interval_secs < self.updates.interval_secs {
            anyhow::bail!(
                "updates.ignored_interval_secs ({}) must not be shorter than updates.interval_secs ({})",
                self.updates.ignored_interval_secs,
                self.updates.interval_secs
            );
        }

        if !(1..=100).contains(&self.updates.changelog_limit) {
            anyhow::bail!(
                "updates.changelog_limit must be between 1 and 100 (got {})",
                self.updates.changelog_limit
            );
        }

        if !(100..=1_000_000).contains(&self.logs.capacity) {
            anyhow::bail!(
                "logs.capacity must be between 100 and 1,000,000 (got {})",
                self.logs.capacity
            );
        }

        Ok(())
    }

    /// Read one value by dotted key
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "host.prefix" => self.host.prefix.clone(),
            "host.owner_chat" => self.host.owner_chat.to_string(),
            "host.modules_dir" => self.host.modules_dir.display().to_string(),
            "host.store_path" => self.host.store_path.display().to_string(),
            "host.outbox_dir" => self.host.outbox_dir.display().to_string(),
            "watcher.debug_dir" => self.watcher.debug_dir.display().to_string(),
            "watcher.interval_ms" => self.watcher.interval_ms.to_string(),
            "watcher.extension" => self.watcher.extension.clone(),
            "updates.enabled" => self.updates.enabled.to_string(),
            "updates.repo_path" => self.updates.repo_path.display().to_string(),
            "updates.remote" => self.updates.remote.clone(),
            "updates.branch" => self.updates.branch.clone(),
            "updates.repo_url" => self.updates.repo_url.clone(),
            "updates.interval_secs" => self.updates.interval_secs.to_string(),
            "updates.ignored_interval_secs" => self.updates.ignored_interval_secs.to_string(),
            "updates.changelog_limit" => self.updates.changelog_limit.to_string(),
            "logs.level" => self.logs.level.clone(),
            "logs.capacity" => self.logs.capacity.to_string(),
            _ => anyhow::bail!(
                "Unknown config key: {}. Use 'dk config list' to see available keys.",
                key
            ),
        };
        Ok(value)
    }

    /// Set one value by dotted key, then validate
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fn int<T: std::str::FromStr>(value: &str) -> Result<T> {
            value
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid value: must be an integer"))
        }

        fn boolean(value: &str) -> Result<bool> {
            value
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid value: must be 'true' or 'false'"))
        }

        match key {
            "host.prefix" => self.host.prefix = value.to_string(),
            "host.owner_chat" => self.host.owner_chat = int(value)?,
            "host.modules_dir" => self.host.modules_dir = PathBuf::from(value),
            "host.store_path" => self.host.store_path = PathBuf::from(value),
            "host.outbox_dir" => self.host.outbox_dir = PathBuf::from(value),
            "watcher.debug_dir" => self.watcher.debug_dir = PathBuf::from(value),
            "watcher.interval_ms" => self.watcher.interval_ms = int(value)?,
            "watcher.extension" => self.watcher.extension = value.to_string(),
            "updates.enabled" => self.updates.enabled = boolean(value)?,
            "updates.repo_path" => self.updates.repo_path = PathBuf::from(value),
            "updates.remote" => self.updates.remote = value.to_string(),
            "updates.branch" => self.updates.branch = value.to_string(),
            "updates.repo_url" => self.updates.repo_url = value.to_string(),
            "updates.interval_secs" => self.updates.interval_secs = int(value)?,
            "updates.ignored_interval_secs" => self.updates.ignored_interval_secs = int(value)?,
            "updates.changelog_limit" => self.updates.changelog_limit = int(value)?,
            "logs.level" => self.logs.level = value.to_string(),
            "logs.capacity" => self.logs.capacity = int(value)?,
            _ => anyhow::bail!(
                "Unknown config key: {}. Use 'dk config list' to see available keys.",
                key
            ),
        }

        self.validate().context("Invalid configuration value")
    }
}

/// Default config file location
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("devkit").join("config.toml"))
}

/// Load config from `path`, or defaults if the file does not exist
pub fn load(path: &Path) -> Result<DevkitConfig> {
    if !path.exists() {
        return Ok(DevkitConfig::default());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: DevkitConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok(config)
}

pub fn save(path: &Path, config: &DevkitConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write the default config if no file exists yet
pub fn init_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save(path, &DevkitConfig::default())?;
    Ok(true)
}

/// Default configuration rendered as TOML
pub fn example_config() -> String {
    toml::to_string_pretty(&DevkitConfig::default()).unwrap_or_default()
}
