//! Read-only projections of a progress record over the catalog.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;

use crate::achievements::{Achievement, achievement};
use crate::model::{Catalog, ProgressRecord};
use crate::streak::current_streak;

/// Solved / total over some set of task keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub completed: usize,
    pub total: usize,
}

impl Completion {
    #[must_use]
    pub fn of(keys: &BTreeSet<&str>, record: &ProgressRecord) -> Self {
        let completed = keys
            .iter()
            .filter(|key| record.is_task_completed(key))
            .count();
        Self {
            completed,
            total: keys.len(),
        }
    }

    /// Percentage in `0..=100`, or `None` when there is nothing to complete.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> Option<f64> {
        (self.total > 0).then(|| self.completed as f64 / self.total as f64 * 100.0)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRollup {
    pub id: String,
    pub name: String,
    pub completion: Completion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRollup {
    pub id: String,
    pub name: String,
    pub completion: Completion,
    pub commands: Vec<CommandRollup>,
}

/// Coarse grading of a test score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    NeedsPractice,
}

impl ScoreBand {
    #[must_use]
    pub fn of(score: f64) -> Self {
        if score >= 90.0 {
            ScoreBand::Excellent
        } else if score >= 70.0 {
            ScoreBand::Good
        } else {
            ScoreBand::NeedsPractice
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestSummary {
    pub level: String,
    pub name: Option<String>,
    pub score: f64,
    pub completed_at: NaiveDateTime,
    pub band: ScoreBand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioSummary {
    pub completion: Completion,
    /// Names of completed scenarios still present in the catalog.
    pub completed_names: Vec<String>,
}

/// Everything the progress screen shows for one user.
#[derive(Debug, Clone)]
pub struct ProgressReport {
    pub overall: Completion,
    pub tests: Vec<TestSummary>,
    pub modules: Vec<ModuleRollup>,
    pub scenarios: ScenarioSummary,
    pub achievements: Vec<&'static Achievement>,
    pub first_login: NaiveDateTime,
    pub last_login: NaiveDateTime,
    pub success_rate: Option<f64>,
    pub correct_answers: u64,
    pub total_attempts: u64,
    pub session_count: usize,
    pub current_streak: u32,
    /// Whole seconds over all normally finished sessions.
    pub total_time: u64,
}

/// Completion over every distinct task key in the catalog.
#[must_use]
pub fn overall_completion(catalog: &Catalog, record: &ProgressRecord) -> Completion {
    Completion::of(&catalog.all_task_keys(), record)
}

/// Per-module rollups with nested per-command rollups; modules without tasks are skipped.
#[must_use]
pub fn module_rollups(catalog: &Catalog, record: &ProgressRecord) -> Vec<ModuleRollup> {
    catalog
        .modules()
        .iter()
        .filter_map(|(id, module)| {
            let completion = Completion::of(&module.task_keys(), record);
            if completion.total == 0 {
                return None;
            }
            let commands = module
                .commands
                .iter()
                .map(|(cmd_id, cmd)| CommandRollup {
                    id: cmd_id.clone(),
                    name: cmd.name.clone(),
                    completion: Completion::of(&cmd.task_keys(), record),
                })
                .filter(|c| c.completion.total > 0)
                .collect();
            Some(ModuleRollup {
                id: id.clone(),
                name: module.name.clone(),
                completion,
                commands,
            })
        })
        .collect()
}

/// Latest result per test level, in catalog order; levels unknown to the catalog follow.
#[must_use]
pub fn test_summaries(catalog: &Catalog, record: &ProgressRecord) -> Vec<TestSummary> {
    let results = record.test_results();
    let known = catalog.tests().keys().filter(|level| results.contains_key(*level));
    let unknown = results
        .keys()
        .filter(|level| !catalog.tests().contains_key(*level));

    known
        .chain(unknown)
        .filter_map(|level| {
            let result = results.get(level)?;
            Some(TestSummary {
                level: level.clone(),
                name: catalog.test_level(level).and_then(|t| t.name.clone()),
                score: result.score,
                completed_at: result.completed_at,
                band: ScoreBand::of(result.score),
            })
        })
        .collect()
}

#[must_use]
pub fn scenario_summary(catalog: &Catalog, record: &ProgressRecord) -> ScenarioSummary {
    let done = record.completed_scenarios();
    let completed_names: Vec<String> = catalog
        .scenarios()
        .values()
        .filter(|s| done.contains(&s.id))
        .map(|s| s.name.clone())
        .collect();
    ScenarioSummary {
        completion: Completion {
            completed: completed_names.len(),
            total: catalog.scenarios().len(),
        },
        completed_names,
    }
}

/// Assemble the full progress report.
#[must_use]
pub fn build_report(catalog: &Catalog, record: &ProgressRecord) -> ProgressReport {
    let stats = record.session_stats();
    ProgressReport {
        overall: overall_completion(catalog, record),
        tests: test_summaries(catalog, record),
        modules: module_rollups(catalog, record),
        scenarios: scenario_summary(catalog, record),
        achievements: record
            .achievements()
            .iter()
            .map(|id| achievement(*id))
            .collect(),
        first_login: stats.first_login,
        last_login: stats.last_login,
        success_rate: record.success_rate(),
        correct_answers: stats.correct_answers,
        total_attempts: stats.total_attempts,
        session_count: stats.sessions.len(),
        current_streak: current_streak(record.session_dates()),
        total_time: stats.total_time,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
