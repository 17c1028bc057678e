use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use tracing::warn;

pub const DEFAULT_LOG_FILE: &str = "parking_log.txt";

/// Append-only destination for parking events, one formatted line per event.
///
/// Recording is best-effort: a sink that cannot write drops the line and the
/// caller never sees an error.
pub trait LogSink: Send {
    fn record(&self, line: &str);
}

/// Formats an event as `[YYYY-MM-DD HH:MM:SS] message`
pub fn format_line(timestamp: NaiveDateTime, message: &str) -> String {
    format!("[{}] {}", timestamp.format("%Y-%m-%d %H:%M:%S"), message)
}

/// Appends lines to a text file, opening it for every write
#[derive(Debug, Clone)]
pub struct FileLog {
    path: PathBuf,
}

impl FileLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}

impl LogSink for FileLog {
    fn record(&self, line: &str) {
        if let Err(e) = self.append(line) {
            warn!(path = %self.path.display(), error = %e, "failed to write parking log");
        }
    }
}

/// Keeps recorded lines in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LogSink for MemoryLog {
    fn record(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl LogSink for NullLog {
    fn record(&self, _line: &str) {}
}
