use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;
use trainer_core::Clock;
use trainer_core::model::serde_fmt::timestamp;

/// Severity tag written into every event line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Info,
    Success,
    Warning,
    Error,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Info => "INFO",
            Category::Success => "SUCCESS",
            Category::Warning => "WARNING",
            Category::Error => "ERROR",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(with = "timestamp")]
    pub timestamp: NaiveDateTime,
    pub category: Category,
    pub user: String,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}] [{}] {}",
            self.timestamp.format(timestamp::FORMAT),
            self.category,
            self.user,
            self.message
        )
    }
}

/// Append-only event log for the running session.
///
/// Every entry is kept in memory for the end-of-session report and appended
/// to the text log file when one is configured. File failures are reported
/// through `tracing` and otherwise ignored; logging never fails the caller.
///
/// Clones share the same in-memory log.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    file: Option<PathBuf>,
    clock: Clock,
}

impl EventLog {
    /// Log that also appends to the text file at `path`.
    #[must_use]
    pub fn to_file(path: impl Into<PathBuf>, clock: Clock) -> Self {
        Self {
            entries: Arc::default(),
            file: Some(path.into()),
            clock,
        }
    }

    /// Log that only keeps entries in memory.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self {
            entries: Arc::default(),
            file: None,
            clock,
        }
    }

    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn record(&self, user: &str, category: Category, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: self.clock.now(),
            category,
            user: user.to_owned(),
            message: message.into(),
        };

        if let Some(path) = &self.file {
            if let Err(err) = append_line(path, &entry) {
                warn!(path = %path.display(), error = %err, "failed to write event log");
            }
        }

        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    pub fn info(&self, user: &str, message: impl Into<String>) {
        self.record(user, Category::Info, message);
    }

    pub fn success(&self, user: &str, message: impl Into<String>) {
        self.record(user, Category::Success, message);
    }

    pub fn warning(&self, user: &str, message: impl Into<String>) {
        self.record(user, Category::Warning, message);
    }

    pub fn error(&self, user: &str, message: impl Into<String>) {
        self.record(user, Category::Error, message);
    }

    /// Snapshot of everything logged so far in this process.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn append_line(path: &Path, entry: &LogEntry) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{entry}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use trainer_core::time::fixed_clock;

    #[test]
    fn formats_line_with_category_and_user() {
        let log = EventLog::in_memory(fixed_clock());
        log.success("Алиса", "Profile created");

        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].to_string(),
            "[2024-01-05 09:30:00] [SUCCESS] [Алиса] Profile created"
        );
    }

    #[test]
    fn clones_share_entries() {
        let log = EventLog::in_memory(fixed_clock());
        let other = log.clone();
        other.info("bob", "hello");
        log.warning("bob", "careful");

        let categories: Vec<_> = log.entries().iter().map(|e| e.category).collect();
        assert_eq!(categories, [Category::Info, Category::Warning]);
    }

    #[test]
    fn unwritable_file_is_swallowed() {
        let log = EventLog::to_file("/nonexistent-dir/for/sure/log.txt", fixed_clock());
        log.error("bob", "still recorded");
        assert_eq!(log.entries().len(), 1);
    }
}
