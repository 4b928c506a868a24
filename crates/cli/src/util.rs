//! Shared helpers for console commands

use chrono::{DateTime, Local};
use std::time::Duration;

/// Uptime as `H:MM:SS`, prefixed by days when longer than one
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let days = secs / 86_400;
    let clock = format!("{}:{:02}:{:02}", (secs % 86_400) / 3600, (secs % 3600) / 60, secs % 60);

    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}

/// Time elapsed since `started`
pub fn uptime_since(started: DateTime<Local>) -> Duration {
    (Local::now() - started).to_std().unwrap_or_default()
}

/// Human-readable operating system and architecture
pub fn named_platform() -> String {
    let os = match std::env::consts::OS {
        "linux" => "🐧 Linux",
        "macos" => "🍏 macOS",
        "windows" => "🪟 Windows",
        "freebsd" => "😈 FreeBSD",
        other => other,
    };
    format!("{} ({})", os, std::env::consts::ARCH)
}
