use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use storage::{EventLog, LogEntry, ProgressRepository};
use trainer_core::Clock;
use trainer_core::model::ProgressRecord;
use trainer_core::model::serde_fmt::timestamp;

use crate::error::ReportError;
use crate::session_context::SessionContext;

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// How the interactive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Normal,
    Interrupted,
}

/// Everything a report sink gets at the end of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub user: String,
    #[serde(with = "timestamp")]
    pub started_at: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub finished_at: NaiveDateTime,
    pub reason: ExitReason,
    pub log: Vec<LogEntry>,
    /// Final state of the user's record, if it could be read back.
    pub record: Option<ProgressRecord>,
}

impl SessionSummary {
    /// Plain-text rendering: a header, the session log, then the record as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Render` if the record cannot be serialized.
    pub fn render(&self) -> Result<String, ReportError> {
        let mut out = String::new();
        let fmt_err = |e: std::fmt::Error| ReportError::Render(e.to_string());

        writeln!(out, "Training session report").map_err(fmt_err)?;
        writeln!(out, "session:  {}", self.session_id).map_err(fmt_err)?;
        let user = if self.user.is_empty() { "(not signed in)" } else { &self.user };
        writeln!(out, "user:     {user}").map_err(fmt_err)?;
        writeln!(out, "started:  {}", self.started_at.format(timestamp::FORMAT)).map_err(fmt_err)?;
        writeln!(out, "finished: {}", self.finished_at.format(timestamp::FORMAT)).map_err(fmt_err)?;
        let reason = match self.reason {
            ExitReason::Normal => "normal exit",
            ExitReason::Interrupted => "interrupted",
        };
        writeln!(out, "reason:   {reason}").map_err(fmt_err)?;

        writeln!(out, "\nSession log ({} entries):", self.log.len()).map_err(fmt_err)?;
        for entry in &self.log {
            writeln!(out, "{entry}").map_err(fmt_err)?;
        }

        if let Some(record) = &self.record {
            let json = serde_json::to_string_pretty(record)
                .map_err(|e| ReportError::Render(e.to_string()))?;
            writeln!(out, "\nFinal progress:\n{json}").map_err(fmt_err)?;
        }
        Ok(out)
    }
}

//
// ─── SINKS ─────────────────────────────────────────────────────────────────────
//

/// Destination for end-of-session reports.
pub trait ReportSink: Send + Sync {
    /// Deliver one summary.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if delivery fails. Callers log it and move on.
    fn deliver(&self, summary: &SessionSummary) -> Result<(), ReportError>;
}

/// Accepts every report and sends it nowhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReportSink;

impl ReportSink for NoopReportSink {
    fn deliver(&self, _summary: &SessionSummary) -> Result<(), ReportError> {
        Ok(())
    }
}

/// Writes each report as a text file into a directory.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    dir: PathBuf,
}

impl FileReportSink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `session-<start>-<id>.txt` inside the report directory.
    #[must_use]
    pub fn path_for(&self, summary: &SessionSummary) -> PathBuf {
        self.dir.join(format!(
            "session-{}-{}.txt",
            summary.started_at.format("%Y%m%d-%H%M%S"),
            summary.session_id
        ))
    }
}

impl ReportSink for FileReportSink {
    fn deliver(&self, summary: &SessionSummary) -> Result<(), ReportError> {
        let body = summary.render()?;
        fs::create_dir_all(&self.dir).map_err(|source| ReportError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(summary);
        fs::write(&path, body).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "session report written");
        Ok(())
    }
}

//
// ─── FINALIZER ─────────────────────────────────────────────────────────────────
//

/// Runs the end-of-session steps exactly once, whichever way the session ends.
///
/// Both the normal exit path and the interrupt handler hold the same
/// finalizer; the first caller wins and later calls do nothing.
pub struct SessionFinalizer {
    ctx: SessionContext,
    clock: Clock,
    repo: Arc<dyn ProgressRepository>,
    log: EventLog,
    sink: Arc<dyn ReportSink>,
    done: AtomicBool,
}

impl SessionFinalizer {
    #[must_use]
    pub fn new(
        ctx: SessionContext,
        clock: Clock,
        repo: Arc<dyn ProgressRepository>,
        log: EventLog,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            ctx,
            clock,
            repo,
            log,
            sink,
            done: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Log the end of the session and hand the summary to the sink.
    ///
    /// Returns `None` if the session was already finalized. Delivery failures
    /// are logged, never returned.
    pub fn finish(&self, reason: ExitReason) -> Option<SessionSummary> {
        if self.done.swap(true, Ordering::SeqCst) {
            return None;
        }

        let user = self.ctx.user();
        match reason {
            ExitReason::Normal => self.log.info(user, "Session finished."),
            ExitReason::Interrupted => self.log.warning(user, "Program interrupted (Ctrl+C)."),
        }

        let record = if self.ctx.is_anonymous() {
            None
        } else {
            match self.repo.load_all() {
                Ok(mut all) => all.remove(user),
                Err(err) => {
                    warn!(error = %err, "could not read progress for the session report");
                    None
                }
            }
        };

        let summary = SessionSummary {
            session_id: self.ctx.session_id(),
            user: user.to_owned(),
            started_at: self.ctx.started_at(),
            finished_at: self.clock.now(),
            reason,
            log: self.log.entries(),
            record,
        };

        if let Err(err) = self.sink.deliver(&summary) {
            warn!(error = %err, "session report delivery failed");
            self.log.error(user, format!("Report delivery failed: {err}"));
        }
        Some(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use storage::{Category, InMemoryRepository, ProgressMap};
    use trainer_core::time::{fixed_clock, fixed_now};

    #[derive(Default)]
    struct CountingSink {
        delivered: Mutex<Vec<ExitReason>>,
    }

    impl ReportSink for CountingSink {
        fn deliver(&self, summary: &SessionSummary) -> Result<(), ReportError> {
            self.delivered.lock().unwrap().push(summary.reason);
            Ok(())
        }
    }

    struct FailingSink;

    impl ReportSink for FailingSink {
        fn deliver(&self, _summary: &SessionSummary) -> Result<(), ReportError> {
            Err(ReportError::Render("smtp is down".into()))
        }
    }

    fn finalizer(sink: Arc<dyn ReportSink>) -> (SessionFinalizer, EventLog) {
        let mut map = ProgressMap::new();
        let mut record = ProgressRecord::new(fixed_now());
        record.complete_task("ls");
        map.insert("bob".into(), record);

        let log = EventLog::in_memory(fixed_clock());
        let ctx = SessionContext::start("bob", "Guest", fixed_clock());
        let fin = SessionFinalizer::new(
            ctx,
            fixed_clock(),
            Arc::new(InMemoryRepository::with_progress(map)),
            log.clone(),
            sink,
        );
        (fin, log)
    }

    #[test]
    fn delivers_exactly_once() {
        let sink = Arc::new(CountingSink::default());
        let (fin, log) = finalizer(sink.clone());

        let summary = fin.finish(ExitReason::Interrupted).unwrap();
        assert!(fin.finish(ExitReason::Normal).is_none());
        assert!(fin.is_finished());

        assert_eq!(*sink.delivered.lock().unwrap(), [ExitReason::Interrupted]);
        assert!(summary.record.unwrap().is_task_completed("ls"));
        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, Category::Warning);
    }

    #[test]
    fn delivery_failure_is_logged_not_raised() {
        let (fin, log) = finalizer(Arc::new(FailingSink));
        assert!(fin.finish(ExitReason::Normal).is_some());

        let last = log.entries().pop().unwrap();
        assert_eq!(last.category, Category::Error);
        assert!(last.message.contains("smtp is down"));
    }

    #[test]
    fn render_includes_log_and_record() {
        let (fin, _) = finalizer(Arc::new(NoopReportSink));
        let text = fin.finish(ExitReason::Normal).unwrap().render().unwrap();
        assert!(text.contains("user:     bob"));
        assert!(text.contains("[INFO] [bob] Session finished."));
        assert!(text.contains("\"completed_tasks\""));
    }
}
