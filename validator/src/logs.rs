//! Run log for the validation pipeline.
//!
//! Progress messages go to stderr so stdout stays reserved for results
//! (`--json` prints exactly one line there). Every entry is also broadcast
//! so embedding callers and tests can observe a run.

use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Log level for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth for grouped lines
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Render the entry as printed on stderr.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "  ",
            LogLevel::Success => "✓",
            LogLevel::Warning => "⚠️",
            LogLevel::Error => "❌",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!("{}{} {}", indent, prefix, self.message)
    }
}

/// Global run log
pub static RUN_LOG: Lazy<RunLog> = Lazy::new(RunLog::new);

/// Prints log entries and broadcasts them to subscribers
pub struct RunLog {
    sender: broadcast::Sender<LogEntry>,
    quiet: AtomicBool,
}

impl RunLog {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender, quiet: AtomicBool::new(false) }
    }

    /// Stop (or resume) printing to stderr. Subscribers still receive entries.
    pub fn set_quiet(&self, quiet: bool) {
        self.quiet.store(quiet, Ordering::Relaxed);
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet.load(Ordering::Relaxed)
    }

    /// Print and broadcast an entry
    pub fn log(&self, entry: LogEntry) {
        if !self.is_quiet() {
            eprintln!("{}", entry.render());
        }

        // No receivers is fine
        let _ = self.sender.send(entry);
    }

    /// Get a receiver for the entries logged from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    RUN_LOG.log(LogEntry::info(msg).with_indent(indent));
}
