use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use storage::{EventLog, Storage, load_catalog};
use trainer_core::Clock;
use trainer_core::model::Catalog;

use crate::error::{BootstrapError, ProgressServiceError};
use crate::practice::PracticeService;
use crate::progress_service::{ProgressService, SignIn};
use crate::report::{ExitReason, FileReportSink, NoopReportSink, ReportSink, SessionFinalizer, SessionSummary};
use crate::session_context::{DEFAULT_USER, SessionContext};

/// Where the trainer reads and writes its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainerConfig {
    pub catalog_path: PathBuf,
    pub progress_path: PathBuf,
    /// Text event log; `None` keeps events in memory only.
    pub log_path: Option<PathBuf>,
    /// Directory for session reports; `None` discards them.
    pub report_dir: Option<PathBuf>,
    pub default_user: String,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("training_data.json"),
            progress_path: PathBuf::from("user_progress.json"),
            log_path: Some(PathBuf::from("training_log.txt")),
            report_dir: None,
            default_user: DEFAULT_USER.to_owned(),
        }
    }
}

/// A signed-in user and the finalizer that closes their session.
pub struct StartedSession {
    pub ctx: SessionContext,
    pub sign_in: SignIn,
    pub finalizer: Arc<SessionFinalizer>,
}

/// Assembles the trainer's services over one catalog and one progress store.
///
/// Fields are public so callers can borrow services independently, e.g. the
/// practice service alongside a mutable progress service.
pub struct TrainerServices {
    pub clock: Clock,
    pub catalog: Arc<Catalog>,
    pub storage: Storage,
    pub log: EventLog,
    pub progress: ProgressService,
    pub practice: PracticeService,
    pub sink: Arc<dyn ReportSink>,
    default_user: String,
}

impl TrainerServices {
    /// Load the catalog and progress store named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `BootstrapError::Catalog` if the catalog is missing or invalid,
    /// or `BootstrapError::Progress` if the progress file is malformed.
    pub fn bootstrap(config: &TrainerConfig, clock: Clock) -> Result<Self, BootstrapError> {
        let catalog = load_catalog(&config.catalog_path)?;
        let storage = Storage::json(&config.progress_path);
        let log = match &config.log_path {
            Some(path) => EventLog::to_file(path, clock),
            None => EventLog::in_memory(clock),
        };
        let sink: Arc<dyn ReportSink> = match &config.report_dir {
            Some(dir) => Arc::new(FileReportSink::new(dir)),
            None => Arc::new(NoopReportSink),
        };
        let services = Self::from_parts(catalog, storage, log, sink, clock)?
            .with_default_user(&config.default_user);
        info!(
            catalog = %config.catalog_path.display(),
            progress = %config.progress_path.display(),
            "trainer services ready"
        );
        Ok(services)
    }

    /// Build services from already-loaded parts.
    ///
    /// # Errors
    ///
    /// Returns `BootstrapError::Progress` if the progress store cannot be read.
    pub fn from_parts(
        catalog: Catalog,
        storage: Storage,
        log: EventLog,
        sink: Arc<dyn ReportSink>,
        clock: Clock,
    ) -> Result<Self, BootstrapError> {
        let catalog = Arc::new(catalog);
        let progress = ProgressService::load(
            clock,
            Arc::clone(&catalog),
            Arc::clone(&storage.progress),
            log.clone(),
        )?;
        let practice = PracticeService::new(Arc::clone(&catalog));
        Ok(Self {
            clock,
            catalog,
            storage,
            log,
            progress,
            practice,
            sink,
            default_user: DEFAULT_USER.to_owned(),
        })
    }

    /// Name used when the user enters none.
    #[must_use]
    pub fn with_default_user(mut self, name: &str) -> Self {
        self.default_user = name.to_owned();
        self
    }

    #[must_use]
    pub fn with_practice(mut self, practice: PracticeService) -> Self {
        self.practice = practice;
        self
    }

    #[must_use]
    pub fn default_user(&self) -> &str {
        &self.default_user
    }

    /// Sign in `name` (blank means the default user) and prepare the
    /// session finalizer.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the sign-in cannot be saved.
    pub fn start_session(&mut self, name: &str) -> Result<StartedSession, ProgressServiceError> {
        let ctx = SessionContext::start(name, &self.default_user, self.clock);
        let sign_in = self.progress.sign_in(ctx.user())?;
        self.log.info(ctx.user(), "Trainer started.");

        let finalizer = Arc::new(SessionFinalizer::new(
            ctx.clone(),
            self.clock,
            Arc::clone(&self.storage.progress),
            self.log.clone(),
            Arc::clone(&self.sink),
        ));
        Ok(StartedSession {
            ctx,
            sign_in,
            finalizer,
        })
    }

    /// Finalizer for an interrupt that arrives before sign-in. Its report
    /// carries the log so far and no progress record.
    #[must_use]
    pub fn pre_sign_in_finalizer(&self) -> Arc<SessionFinalizer> {
        Arc::new(SessionFinalizer::new(
            SessionContext::anonymous(self.clock),
            self.clock,
            Arc::clone(&self.storage.progress),
            self.log.clone(),
            Arc::clone(&self.sink),
        ))
    }

    /// Normal exit: add the session length to the user's total time, then
    /// finalize. A failure to store the time is logged and does not stop the
    /// report. Ending an already finished session does nothing.
    pub fn end_session(&mut self, session: &StartedSession) -> Option<SessionSummary> {
        if session.finalizer.is_finished() {
            return None;
        }
        let user = session.ctx.user();
        let elapsed = session.ctx.elapsed_secs(self.clock.now());
        if let Err(err) = self.progress.add_session_time(user, elapsed) {
            warn!(error = %err, "could not store session time");
            self.log.error(user, format!("Could not store session time: {err}"));
        }
        session.finalizer.finish(ExitReason::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::fs;
    use tempfile::tempdir;
    use trainer_core::time::{fixed_clock, fixed_now};

    #[test]
    fn bootstrap_fails_fast_on_missing_catalog() {
        let dir = tempdir().unwrap();
        let config = TrainerConfig {
            catalog_path: dir.path().join("missing.json"),
            progress_path: dir.path().join("progress.json"),
            log_path: None,
            ..TrainerConfig::default()
        };
        let err = TrainerServices::bootstrap(&config, fixed_clock()).err().unwrap();
        assert!(matches!(err, BootstrapError::Catalog(_)));
    }

    #[test]
    fn bootstrap_fails_fast_on_malformed_progress() {
        let dir = tempdir().unwrap();
        let catalog = dir.path().join("training_data.json");
        let progress = dir.path().join("user_progress.json");
        fs::write(&catalog, "{}").unwrap();
        fs::write(&progress, "[1, 2").unwrap();

        let config = TrainerConfig {
            catalog_path: catalog,
            progress_path: progress,
            log_path: None,
            ..TrainerConfig::default()
        };
        let err = TrainerServices::bootstrap(&config, fixed_clock()).err().unwrap();
        assert!(matches!(err, BootstrapError::Progress(_)));
    }

    #[test]
    fn blank_name_signs_in_default_user() {
        let mut services = TrainerServices::from_parts(
            Catalog::default(),
            Storage::in_memory(),
            EventLog::in_memory(fixed_clock()),
            Arc::new(NoopReportSink),
            fixed_clock(),
        )
        .unwrap()
        .with_default_user("Гость");

        let session = services.start_session("  ").unwrap();
        assert_eq!(session.ctx.user(), "Гость");
        assert_eq!(session.sign_in, SignIn::Created);

        let summary = services.end_session(&session).unwrap();
        assert_eq!(summary.reason, ExitReason::Normal);
        assert!(services.end_session(&session).is_none());
    }

    #[test]
    fn session_time_is_added_once() {
        let mut services = TrainerServices::from_parts(
            Catalog::default(),
            Storage::in_memory(),
            EventLog::in_memory(fixed_clock()),
            Arc::new(NoopReportSink),
            fixed_clock(),
        )
        .unwrap();
        let session = services.start_session("bob").unwrap();

        services.clock = Clock::fixed(fixed_now() + Duration::seconds(60));
        assert!(services.end_session(&session).is_some());
        assert!(services.end_session(&session).is_none());

        let stats = services.progress.record("bob").unwrap().session_stats();
        assert_eq!(stats.total_time, 60);
    }

    #[test]
    fn interrupt_before_sign_in_still_reports() {
        let services = TrainerServices::from_parts(
            Catalog::default(),
            Storage::in_memory(),
            EventLog::in_memory(fixed_clock()),
            Arc::new(NoopReportSink),
            fixed_clock(),
        )
        .unwrap();

        let finalizer = services.pre_sign_in_finalizer();
        let summary = finalizer.finish(ExitReason::Interrupted).unwrap();
        assert_eq!(summary.reason, ExitReason::Interrupted);
        assert!(summary.user.is_empty());
        assert!(summary.record.is_none());
        assert!(summary.render().unwrap().contains("user:     (not signed in)"));
        assert!(finalizer.finish(ExitReason::Interrupted).is_none());

        let messages: Vec<_> = services.log.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, ["Program interrupted (Ctrl+C)."]);
    }
}
