//! Tracing setup and in-memory log capture
//!
//! Three outputs: stderr (filtered by `RUST_LOG` or config), an in-memory
//! ring buffer read by the `logs` command, and an optional daily-rolling file.

use crate::config::LogsConfig;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use tracing::{Level, Metadata};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Numeric verbosity of a tracing level (10 = debug ... 40 = error)
pub fn level_number(level: &Level) -> u32 {
    match *level {
        Level::ERROR => 40,
        Level::WARN => 30,
        Level::INFO => 20,
        Level::DEBUG => 10,
        Level::TRACE => 5,
    }
}

#[derive(Debug, Clone)]
struct CapturedLine {
    level: u32,
    text: String,
}

/// Bounded buffer of recent formatted log lines
#[derive(Debug, Clone)]
pub struct LogCapture {
    lines: Arc<Mutex<VecDeque<CapturedLine>>>,
    capacity: usize,
}

impl LogCapture {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(1024)))),
            capacity: capacity.max(1),
        }
    }

    /// Record text at `level`, one entry per non-blank line
    pub fn push(&self, level: u32, text: &str) {
        let mut lines = self.lines.lock();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            if lines.len() == self.capacity {
                lines.pop_front();
            }
            lines.push_back(CapturedLine {
                level,
                text: line.to_string(),
            });
        }
    }

    /// Lines at or above `min_level`, oldest first
    pub fn dump(&self, min_level: u32) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|l| l.level >= min_level)
            .map(|l| l.text.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

/// Writer handed out per event; commits on drop
pub struct CaptureWriter {
    capture: LogCapture,
    level: u32,
    buf: Vec<u8>,
}

impl Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for CaptureWriter {
    fn drop(&mut self) {
        if !self.buf.is_empty() {
            self.capture.push(self.level, &String::from_utf8_lossy(&self.buf));
        }
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            capture: self.clone(),
            level: level_number(&Level::INFO),
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        CaptureWriter {
            capture: self.clone(),
            level: level_number(meta.level()),
            buf: Vec::new(),
        }
    }
}

/// Keeps the file writer alive; drop on shutdown to flush
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber
pub fn init(config: &LogsConfig, capture: LogCapture) -> Result<LoggingGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    let capture_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(capture)
        .with_filter(LevelFilter::DEBUG);

    let (file_layer, file_guard) = match &config.file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let dir = dir.map(|p| p.to_path_buf()).unwrap_or_else(|| ".".into());
            std::fs::create_dir_all(&dir).context("Failed to create log directory")?;

            let file_name = path
                .file_name()
                .context("Log file path has no file name")?;
            let appender = tracing_appender::rolling::daily(&dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(LevelFilter::DEBUG);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(capture_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(LoggingGuard { _file: file_guard })
}
