use std::sync::Arc;

use tracing::{debug, info, warn};

use storage::{EventLog, ProgressMap, ProgressRepository};
use trainer_core::Clock;
use trainer_core::achievements::{Achievement, check_achievements};
use trainer_core::model::{Catalog, ProgressRecord};
use trainer_core::stats::{ProgressReport, build_report};

use crate::error::ProgressServiceError;

/// How a user entered the trainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignIn {
    /// First time this name was seen; a fresh record was created.
    Created,
    /// Known user; `last_login` was bumped and a session entry appended.
    Returning,
}

/// Outcome of a completing action.
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    /// False when the action repeated something already in the record.
    pub changed: bool,
    /// Achievements unlocked by this action, in registry order.
    pub unlocked: Vec<&'static Achievement>,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Owns the in-memory progress map and writes it back after every change.
///
/// The whole map is loaded once and saved in full by each mutating call, so a
/// crash loses at most the action in flight. A change reaches the in-memory
/// map only once the store has accepted it.
pub struct ProgressService {
    clock: Clock,
    catalog: Arc<Catalog>,
    repo: Arc<dyn ProgressRepository>,
    log: EventLog,
    progress: ProgressMap,
}

impl ProgressService {
    /// Load every record from `repo`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store exists but cannot
    /// be read or decoded.
    pub fn load(
        clock: Clock,
        catalog: Arc<Catalog>,
        repo: Arc<dyn ProgressRepository>,
        log: EventLog,
    ) -> Result<Self, ProgressServiceError> {
        let progress = repo.load_all()?;
        debug!(users = progress.len(), "progress store loaded");
        Ok(Self {
            clock,
            catalog,
            repo,
            log,
            progress,
        })
    }

    /// Replace the clock used for new timestamps.
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    #[must_use]
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    #[must_use]
    pub fn record(&self, user: &str) -> Option<&ProgressRecord> {
        self.progress.get(user)
    }

    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.progress.keys().map(String::as_str)
    }

    /// Return the record for `user`, creating and saving a zero-valued one if
    /// the name is new. Creation adds no session entry.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the new record cannot be saved.
    pub fn get_or_create(&mut self, user: &str) -> Result<&ProgressRecord, ProgressServiceError> {
        if !self.progress.contains_key(user) {
            self.commit(user, ProgressRecord::new(self.clock.now()))?;
            self.log
                .success(user, format!("Created new profile for {user}"));
            info!(user, "profile created");
        }
        self.progress
            .get(user)
            .ok_or_else(|| ProgressServiceError::UnknownUser(user.to_owned()))
    }

    /// Returning-user login: bump `last_login`, append a session entry, save.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UnknownUser` if there is no record, or
    /// `ProgressServiceError::Storage` if saving fails.
    pub fn touch_login(&mut self, user: &str) -> Result<(), ProgressServiceError> {
        let now = self.clock.now();
        let mut record = self.staged(user)?;
        record.touch_login(now);
        self.commit(user, record)
    }

    /// Enter the trainer as `user`, creating the profile on first sight.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if saving fails.
    pub fn sign_in(&mut self, user: &str) -> Result<SignIn, ProgressServiceError> {
        if self.progress.contains_key(user) {
            self.touch_login(user)?;
            self.log.info(user, format!("Welcome back, {user}!"));
            Ok(SignIn::Returning)
        } else {
            self.get_or_create(user)?;
            Ok(SignIn::Created)
        }
    }

    /// Mark a practice task as solved. Repeating it changes nothing but still
    /// rewrites the store.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the user is unknown or saving fails.
    pub fn record_task_complete(
        &mut self,
        user: &str,
        task_key: &str,
    ) -> Result<Recorded, ProgressServiceError> {
        let recorded = self.apply(user, |record| Ok(record.complete_task(task_key)))?;
        if recorded.changed {
            self.log
                .info(user, format!("Task '{task_key}' marked as completed."));
        }
        Ok(recorded)
    }

    /// Store a test score for `level`, replacing any earlier attempt.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Progress` for scores outside `0..=100`,
    /// or another variant if the user is unknown or saving fails.
    pub fn record_test_result(
        &mut self,
        user: &str,
        level: &str,
        score: f64,
    ) -> Result<Recorded, ProgressServiceError> {
        let now = self.clock.now();
        let recorded = self.apply(user, |record| {
            record.record_test_result(level, score, now)?;
            Ok(true)
        })?;
        self.log
            .info(user, format!("Test level {level} finished with {score:.1}%"));
        Ok(recorded)
    }

    /// Mark a scenario as finished.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the user is unknown or saving fails.
    pub fn record_scenario_complete(
        &mut self,
        user: &str,
        scenario_id: &str,
    ) -> Result<Recorded, ProgressServiceError> {
        let recorded = self.apply(user, |record| Ok(record.complete_scenario(scenario_id)))?;
        if recorded.changed {
            self.log
                .success(user, format!("Scenario '{scenario_id}' completed."));
        }
        Ok(recorded)
    }

    /// Count one evaluated answer towards the success rate.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the user is unknown or saving fails.
    pub fn record_attempt(&mut self, user: &str, correct: bool) -> Result<(), ProgressServiceError> {
        let mut record = self.staged(user)?;
        record.record_attempt(correct);
        self.commit(user, record)
    }

    /// Add the length of a finished session to `total_time`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the user is unknown or saving fails.
    pub fn add_session_time(&mut self, user: &str, seconds: u64) -> Result<(), ProgressServiceError> {
        let mut record = self.staged(user)?;
        record.add_session_time(seconds);
        self.commit(user, record)
    }

    /// Statistics for `user` over the current catalog.
    #[must_use]
    pub fn report(&self, user: &str) -> Option<ProgressReport> {
        self.progress
            .get(user)
            .map(|record| build_report(&self.catalog, record))
    }

    fn apply<F>(&mut self, user: &str, mutate: F) -> Result<Recorded, ProgressServiceError>
    where
        F: FnOnce(&mut ProgressRecord) -> Result<bool, ProgressServiceError>,
    {
        let mut record = self.staged(user)?;
        let changed = mutate(&mut record)?;
        let unlocked = check_achievements(&mut record, &self.catalog);
        self.commit(user, record)?;

        for achievement in &unlocked {
            self.log.success(
                user,
                format!("Achievement unlocked: {}", achievement.name),
            );
            info!(user, achievement = %achievement.id, "achievement unlocked");
        }
        Ok(Recorded { changed, unlocked })
    }

    /// Working copy of the user's record.
    fn staged(&self, user: &str) -> Result<ProgressRecord, ProgressServiceError> {
        self.progress
            .get(user)
            .cloned()
            .ok_or_else(|| ProgressServiceError::UnknownUser(user.to_owned()))
    }

    /// Save the map with `record` in place and keep it only if the store
    /// accepted it.
    fn commit(&mut self, user: &str, record: ProgressRecord) -> Result<(), ProgressServiceError> {
        let previous = self.progress.insert(user.to_owned(), record);
        if let Err(err) = self.repo.save_all(&self.progress) {
            match previous {
                Some(previous) => {
                    self.progress.insert(user.to_owned(), previous);
                }
                None => {
                    self.progress.remove(user);
                }
            }
            warn!(user, error = %err, "progress not saved, change discarded");
            return Err(err.into());
        }
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Duration;
    use storage::{Category, InMemoryRepository, StorageError};
    use trainer_core::model::AchievementId;
    use trainer_core::time::{fixed_clock, fixed_now};

    fn service(repo: &InMemoryRepository) -> ProgressService {
        ProgressService::load(
            fixed_clock(),
            Arc::new(Catalog::default()),
            Arc::new(repo.clone()),
            EventLog::in_memory(fixed_clock()),
        )
        .unwrap()
    }

    /// Store that rejects the next `failures` writes.
    #[derive(Default)]
    struct FlakyRepository {
        inner: InMemoryRepository,
        failures: AtomicUsize,
    }

    impl FlakyRepository {
        fn fail_next(&self, count: usize) {
            self.failures.store(count, Ordering::SeqCst);
        }
    }

    impl ProgressRepository for FlakyRepository {
        fn load_all(&self) -> Result<ProgressMap, StorageError> {
            self.inner.load_all()
        }

        fn save_all(&self, progress: &ProgressMap) -> Result<(), StorageError> {
            let pending = self.failures.load(Ordering::SeqCst);
            if pending > 0 {
                self.failures.store(pending - 1, Ordering::SeqCst);
                return Err(StorageError::Connection("disk full".into()));
            }
            self.inner.save_all(progress)
        }
    }

    fn flaky_service(repo: &Arc<FlakyRepository>) -> ProgressService {
        let repo: Arc<dyn ProgressRepository> = repo.clone();
        ProgressService::load(
            fixed_clock(),
            Arc::new(Catalog::default()),
            repo,
            EventLog::in_memory(fixed_clock()),
        )
        .unwrap()
    }

    #[test]
    fn failed_save_leaves_memory_untouched_and_retry_succeeds() {
        let repo = Arc::new(FlakyRepository::default());
        let mut svc = flaky_service(&repo);
        svc.get_or_create("bob").unwrap();

        repo.fail_next(1);
        let err = svc.record_task_complete("bob", "ls").unwrap_err();
        assert!(matches!(err, ProgressServiceError::Storage(_)));
        let record = svc.record("bob").unwrap();
        assert!(record.completed_tasks().is_empty());
        assert!(record.achievements().is_empty());

        let retry = svc.record_task_complete("bob", "ls").unwrap();
        assert!(retry.changed);
        assert_eq!(retry.unlocked[0].id, AchievementId::FirstSteps);

        let messages: Vec<_> = svc.log().entries().into_iter().map(|e| e.message).collect();
        assert!(messages.contains(&"Task 'ls' marked as completed.".to_owned()));
        assert!(messages.contains(&"Achievement unlocked: First steps".to_owned()));
        assert_eq!(repo.inner.load_all().unwrap()["bob"].completed_tasks().len(), 1);
    }

    #[test]
    fn failed_save_discards_new_profile_and_counters() {
        let repo = Arc::new(FlakyRepository::default());
        let mut svc = flaky_service(&repo);

        repo.fail_next(1);
        assert!(svc.sign_in("bob").is_err());
        assert!(svc.record("bob").is_none());
        assert!(svc.log().entries().is_empty());

        assert_eq!(svc.sign_in("bob").unwrap(), SignIn::Created);
        repo.fail_next(2);
        assert!(svc.record_attempt("bob", true).is_err());
        assert!(svc.add_session_time("bob", 30).is_err());
        let stats = svc.record("bob").unwrap().session_stats();
        assert_eq!((stats.total_attempts, stats.total_time), (0, 0));
    }

    #[test]
    fn first_sign_in_creates_without_session_entry() {
        let repo = InMemoryRepository::new();
        let mut svc = service(&repo);

        assert_eq!(svc.sign_in("Алиса").unwrap(), SignIn::Created);
        let record = svc.record("Алиса").unwrap();
        assert!(record.session_stats().sessions.is_empty());
        assert_eq!(record.session_stats().first_login, fixed_now());
        assert_eq!(repo.save_count().unwrap(), 1);

        let entries = svc.log().entries();
        assert_eq!(entries[0].category, Category::Success);
    }

    #[test]
    fn returning_sign_in_appends_session() {
        let repo = InMemoryRepository::new();
        let mut svc = service(&repo);
        svc.sign_in("bob").unwrap();

        svc.set_clock(Clock::fixed(fixed_now() + Duration::days(1)));
        assert_eq!(svc.sign_in("bob").unwrap(), SignIn::Returning);

        let stats = svc.record("bob").unwrap().session_stats();
        assert_eq!(stats.sessions.len(), 1);
        assert_eq!(stats.last_login, fixed_now() + Duration::days(1));
        assert_eq!(stats.first_login, fixed_now());
    }

    #[test]
    fn get_or_create_leaves_existing_record_alone() {
        let repo = InMemoryRepository::new();
        let mut svc = service(&repo);
        svc.get_or_create("bob").unwrap();
        svc.record_task_complete("bob", "ls").unwrap();

        let before = svc.record("bob").cloned();
        svc.get_or_create("bob").unwrap();
        assert_eq!(svc.record("bob").cloned(), before);
    }

    #[test]
    fn completing_twice_is_idempotent_but_saves() {
        let repo = InMemoryRepository::new();
        let mut svc = service(&repo);
        svc.get_or_create("bob").unwrap();

        let first = svc.record_task_complete("bob", "ls -la").unwrap();
        let second = svc.record_task_complete("bob", "ls -la").unwrap();

        assert!(first.changed);
        assert_eq!(first.unlocked[0].id, AchievementId::FirstSteps);
        assert!(!second.changed);
        assert!(second.unlocked.is_empty());
        assert_eq!(svc.record("bob").unwrap().completed_tasks().len(), 1);
        assert_eq!(repo.save_count().unwrap(), 3);
    }

    #[test]
    fn unknown_user_is_an_error() {
        let repo = InMemoryRepository::new();
        let mut svc = service(&repo);
        let err = svc.record_task_complete("ghost", "ls").unwrap_err();
        assert!(matches!(err, ProgressServiceError::UnknownUser(_)));
        assert_eq!(repo.save_count().unwrap(), 0);
    }

    #[test]
    fn retake_keeps_latest_score() {
        let repo = InMemoryRepository::new();
        let mut svc = service(&repo);
        svc.get_or_create("bob").unwrap();
        svc.record_test_result("bob", "1", 60.0).unwrap();
        svc.record_test_result("bob", "1", 90.0).unwrap();

        let results = svc.record("bob").unwrap().test_results();
        assert_eq!(results.len(), 1);
        assert_eq!(results["1"].score, 90.0);
    }

    #[test]
    fn invalid_score_is_rejected_before_saving() {
        let repo = InMemoryRepository::new();
        let mut svc = service(&repo);
        svc.get_or_create("bob").unwrap();
        let err = svc.record_test_result("bob", "1", 120.0).unwrap_err();
        assert!(matches!(err, ProgressServiceError::Progress(_)));
        assert_eq!(repo.save_count().unwrap(), 1);
    }

    #[test]
    fn attempts_and_time_accumulate() {
        let repo = InMemoryRepository::new();
        let mut svc = service(&repo);
        svc.get_or_create("bob").unwrap();
        svc.record_attempt("bob", true).unwrap();
        svc.record_attempt("bob", false).unwrap();
        svc.add_session_time("bob", 30).unwrap();
        svc.add_session_time("bob", 12).unwrap();

        let stats = svc.record("bob").unwrap().session_stats();
        assert_eq!((stats.correct_answers, stats.total_attempts), (1, 2));
        assert_eq!(stats.total_time, 42);
    }
}
