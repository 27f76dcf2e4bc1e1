//! Logging sinks
//!
//! The engine never prints on its own: every message goes through a [`LogSink`] handed in
//! by the host. [`Logger`] is the console sink with quiet control, and
//! [`MemoryLogger`] keeps entries in memory so callers can inspect what a batch reported.

use std::sync::Mutex;

/// Prefix attached to every message the engine emits.
pub const LOG_PREFIX: &str = "[multi-uploader]";

/// Leveled logging interface provided by the host
pub trait LogSink: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn success(&self, message: &str);

    /// Multi-line text printed as-is, without a level marker
    fn block(&self, text: &str) {
        self.info(text);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Success,
    Block,
}

/// Console logger responsible for all user-visible output
#[derive(Debug, Clone, Default)]
pub struct Logger {
    pub quiet: bool,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only errors are printed
    pub fn new_quiet() -> Self {
        Self { quiet: true }
    }

    /// Console line for an entry, `None` when quiet mode hides it
    pub fn render(&self, level: LogLevel, message: &str) -> Option<String> {
        if self.quiet && level != LogLevel::Error {
            return None;
        }
        Some(match level {
            LogLevel::Info => format!("ℹ️  {}", message),
            LogLevel::Warn => format!("⚠️  WARNING: {}", message),
            LogLevel::Error => format!("❌ ERROR: {}", message),
            LogLevel::Success => format!("✅ {}", message),
            LogLevel::Block => message.to_string(),
        })
    }

    fn print(&self, level: LogLevel, message: &str) {
        match self.render(level, message) {
            Some(line) if level == LogLevel::Error => eprintln!("{}", line),
            Some(line) => println!("{}", line),
            None => {}
        }
    }
}

impl LogSink for Logger {
    fn info(&self, message: &str) {
        self.print(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.print(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.print(LogLevel::Error, message);
    }

    fn success(&self, message: &str) {
        self.print(LogLevel::Success, message);
    }

    fn block(&self, text: &str) {
        self.print(LogLevel::Block, text);
    }
}

/// Sink that records every entry in order
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: LogLevel, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }

    /// Snapshot of all recorded entries
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Messages recorded at the given level
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.messages(level).iter().any(|m| m.contains(needle))
    }
}

impl LogSink for MemoryLogger {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }

    fn success(&self, message: &str) {
        self.push(LogLevel::Success, message);
    }

    fn block(&self, text: &str) {
        self.push(LogLevel::Block, text);
    }
}
