//! Helpers for running the `dk` binary

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// `dk` invocation against a specific config file
pub struct DkCommand {
    config: PathBuf,
    args: Vec<String>,
    stdin_data: Option<String>,
}

impl DkCommand {
    pub fn new(config: impl AsRef<Path>) -> Self {
        Self {
            config: config.as_ref().to_path_buf(),
            args: Vec::new(),
            stdin_data: None,
        }
    }

    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Console input; the session ends at EOF
    pub fn stdin(&mut self, data: &str) -> &mut Self {
        self.stdin_data = Some(data.to_string());
        self
    }

    pub fn execute(&self) -> Result<CommandResult> {
        let start = Instant::now();

        let mut child = Command::new(env!("CARGO_BIN_EXE_dk"))
            .arg("--config")
            .arg(&self.config)
            .args(&self.args)
            .env("RUST_LOG", "warn")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn dk")?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Some(data) = &self.stdin_data {
                stdin.write_all(data.as_bytes())?;
            }
        }

        let output = child.wait_with_output().context("Failed to wait for dk")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }

    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;
        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }
        Ok(result)
    }

    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;
        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }
        Ok(result)
    }
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }
}

/// `dk!(config, "config", "get", "logs.level")`
#[macro_export]
macro_rules! dk {
    ($config:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::DkCommand::new($config);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}
