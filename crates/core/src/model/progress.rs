use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::serde_fmt::{clock_time, timestamp};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("test score must be within 0..=100, got {0}")]
    ScoreOutOfRange(f64),
}

//
// ─── ACHIEVEMENT IDS ───────────────────────────────────────────────────────────
//

/// Stable identifiers of the built-in achievements, as stored in the progress file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstSteps,
    QuickLearner,
    MasterOfBasics,
    TestChampion,
    PersistentStudent,
}

impl AchievementId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AchievementId::FirstSteps => "first_steps",
            AchievementId::QuickLearner => "quick_learner",
            AchievementId::MasterOfBasics => "master_of_basics",
            AchievementId::TestChampion => "test_champion",
            AchievementId::PersistentStudent => "persistent_student",
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── RECORD PARTS ──────────────────────────────────────────────────────────────
//

/// Latest attempt at a test level. Retakes overwrite it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub score: f64,
    #[serde(with = "timestamp")]
    pub completed_at: NaiveDateTime,
}

/// One login of a returning user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub date: NaiveDate,
    #[serde(with = "clock_time")]
    pub start_time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    #[serde(with = "timestamp")]
    pub first_login: NaiveDateTime,
    #[serde(with = "timestamp")]
    pub last_login: NaiveDateTime,
    /// Seconds spent in finished sessions.
    #[serde(default)]
    pub total_time: u64,
    #[serde(default)]
    pub correct_answers: u64,
    #[serde(default)]
    pub total_attempts: u64,
    #[serde(default)]
    pub sessions: Vec<SessionEntry>,
}

//
// ─── PROGRESS RECORD ───────────────────────────────────────────────────────────
//

/// Everything the trainer remembers about one user.
///
/// Completed tasks, completed scenarios and achievements only ever grow; the
/// mutators below are the only way to touch them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    completed_tasks: BTreeSet<String>,
    #[serde(default)]
    test_results: BTreeMap<String, TestResult>,
    #[serde(default)]
    completed_scenarios: BTreeSet<String>,
    #[serde(default)]
    achievements: Vec<AchievementId>,
    session_stats: SessionStats,
}

impl ProgressRecord {
    /// Zero-valued record for a first-time user. No session entry is added.
    #[must_use]
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            completed_tasks: BTreeSet::new(),
            test_results: BTreeMap::new(),
            completed_scenarios: BTreeSet::new(),
            achievements: Vec::new(),
            session_stats: SessionStats {
                first_login: now,
                last_login: now,
                total_time: 0,
                correct_answers: 0,
                total_attempts: 0,
                sessions: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn completed_tasks(&self) -> &BTreeSet<String> {
        &self.completed_tasks
    }

    #[must_use]
    pub fn is_task_completed(&self, key: &str) -> bool {
        self.completed_tasks.contains(key)
    }

    #[must_use]
    pub fn test_results(&self) -> &BTreeMap<String, TestResult> {
        &self.test_results
    }

    #[must_use]
    pub fn completed_scenarios(&self) -> &BTreeSet<String> {
        &self.completed_scenarios
    }

    #[must_use]
    pub fn achievements(&self) -> &[AchievementId] {
        &self.achievements
    }

    #[must_use]
    pub fn has_achievement(&self, id: AchievementId) -> bool {
        self.achievements.contains(&id)
    }

    #[must_use]
    pub fn session_stats(&self) -> &SessionStats {
        &self.session_stats
    }

    /// Calendar days of every recorded session, in insertion order.
    pub fn session_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.session_stats.sessions.iter().map(|s| s.date)
    }

    /// Share of correct answers in percent, if anything was attempted.
    #[must_use]
    pub fn success_rate(&self) -> Option<f64> {
        let stats = &self.session_stats;
        if stats.total_attempts == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = stats.correct_answers as f64 / stats.total_attempts as f64 * 100.0;
        Some(rate)
    }

    /// Mark a task as solved. Returns `false` if it already was.
    pub fn complete_task(&mut self, key: impl Into<String>) -> bool {
        self.completed_tasks.insert(key.into())
    }

    /// Mark a scenario as finished. Returns `false` if it already was.
    pub fn complete_scenario(&mut self, id: impl Into<String>) -> bool {
        self.completed_scenarios.insert(id.into())
    }

    /// Store the result of a test level, replacing any earlier attempt.
    ///
    /// Returns the replaced result, if there was one.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::ScoreOutOfRange` for scores outside `0..=100` or NaN.
    pub fn record_test_result(
        &mut self,
        level: impl Into<String>,
        score: f64,
        completed_at: NaiveDateTime,
    ) -> Result<Option<TestResult>, ProgressError> {
        if !(0.0..=100.0).contains(&score) {
            return Err(ProgressError::ScoreOutOfRange(score));
        }
        Ok(self.test_results.insert(
            level.into(),
            TestResult {
                score,
                completed_at,
            },
        ))
    }

    /// Grant an achievement. Returns `false` if it was already held.
    pub fn unlock(&mut self, id: AchievementId) -> bool {
        if self.has_achievement(id) {
            return false;
        }
        self.achievements.push(id);
        true
    }

    /// Returning-user login: bump `last_login` and append a session entry.
    pub fn touch_login(&mut self, now: NaiveDateTime) {
        self.session_stats.last_login = now;
        self.session_stats.sessions.push(SessionEntry {
            date: now.date(),
            start_time: now.time(),
        });
    }

    pub fn record_attempt(&mut self, correct: bool) {
        let stats = &mut self.session_stats;
        stats.total_attempts = stats.total_attempts.saturating_add(1);
        if correct {
            stats.correct_answers = stats.correct_answers.saturating_add(1);
        }
    }

    pub fn add_session_time(&mut self, seconds: u64) {
        self.session_stats.total_time = self.session_stats.total_time.saturating_add(seconds);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
