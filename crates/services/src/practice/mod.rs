use std::collections::BTreeSet;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use storage::EventLog;
use trainer_core::evaluator::{Verdict, evaluate};
use trainer_core::model::{Catalog, CommandSpec, Task};

use crate::error::PracticeError;
use crate::progress_service::{ProgressService, Recorded};
use crate::session_context::SessionContext;

mod selector;

pub use selector::TaskSelector;

/// What the practice screen should show next for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextTask {
    Ready { task: Task, difficulty: u32 },
    /// Every task of the command has been solved.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct PracticeOutcome {
    pub verdict: Verdict,
    /// Shown after a correct answer when the task carries one.
    pub explanation: Option<String>,
    /// Present only for correct answers.
    pub recorded: Option<Recorded>,
}

/// Serves practice tasks and checks free-text answers against them.
pub struct PracticeService {
    catalog: Arc<Catalog>,
    rng: StdRng,
}

impl PracticeService {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Deterministic task order, for tests.
    #[must_use]
    pub fn with_seed(catalog: Arc<Catalog>, seed: u64) -> Self {
        Self {
            catalog,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// # Errors
    ///
    /// Returns `PracticeError` if the module or command does not exist.
    pub fn command(&self, module_id: &str, command_id: &str) -> Result<&CommandSpec, PracticeError> {
        lookup(&self.catalog, module_id, command_id)
    }

    /// Pick the next unsolved task of a command.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError` if the module or command does not exist.
    pub fn next_task(
        &mut self,
        module_id: &str,
        command_id: &str,
        completed: &BTreeSet<String>,
    ) -> Result<NextTask, PracticeError> {
        let command = lookup(&self.catalog, module_id, command_id)?;
        let selector = TaskSelector::new(&command.practice);
        let next = match selector.select(completed, &mut self.rng) {
            Some(task) => NextTask::Ready {
                task: task.clone(),
                difficulty: task.difficulty,
            },
            None => NextTask::Exhausted,
        };
        debug!(module_id, command_id, exhausted = next == NextTask::Exhausted, "next practice task");
        Ok(next)
    }

    /// Check `answer` for `task`, count the attempt, and record the task as
    /// solved when the answer is correct.
    ///
    /// # Errors
    ///
    /// Returns `PracticeError::Progress` if the progress store cannot be updated.
    pub fn submit(
        &self,
        ctx: &SessionContext,
        progress: &mut ProgressService,
        task: &Task,
        answer: &str,
    ) -> Result<PracticeOutcome, PracticeError> {
        let user = ctx.user();
        progress.log().info(
            user,
            format!("Answered '{answer}' for task '{}'", task.task),
        );

        let verdict = evaluate(answer, &task.solution, &task.error_simulation);
        audit_verdict(progress.log(), user, answer, &task.solution, &verdict);
        progress.record_attempt(user, verdict.is_correct())?;

        if !verdict.is_correct() {
            return Ok(PracticeOutcome {
                verdict,
                explanation: None,
                recorded: None,
            });
        }

        let recorded = progress.record_task_complete(user, task.key())?;
        Ok(PracticeOutcome {
            verdict,
            explanation: task.explanation.clone(),
            recorded: Some(recorded),
        })
    }
}

fn lookup<'c>(
    catalog: &'c Catalog,
    module_id: &str,
    command_id: &str,
) -> Result<&'c CommandSpec, PracticeError> {
    let module = catalog
        .module(module_id)
        .ok_or_else(|| PracticeError::UnknownModule(module_id.to_owned()))?;
    module
        .commands
        .get(command_id)
        .ok_or_else(|| PracticeError::UnknownCommand {
            module: module_id.to_owned(),
            command: command_id.to_owned(),
        })
}

/// Write the audit trail for an evaluated answer. Correct answers log nothing.
pub(crate) fn audit_verdict(
    log: &EventLog,
    user: &str,
    answer: &str,
    expected: &str,
    verdict: &Verdict,
) {
    if verdict.is_correct() {
        return;
    }
    if let Verdict::KnownMistake { wrong_input, .. } = verdict {
        log.warning(user, format!("Known mistake triggered: {wrong_input}"));
    }
    log.warning(
        user,
        format!("Incorrect answer. User: '{answer}', expected: '{expected}'"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::{Category, InMemoryRepository};
    use trainer_core::model::AchievementId;
    use trainer_core::time::fixed_clock;

    const CATALOG: &str = r#"{
        "1": {"name": "Basics", "commands": {
            "1": {"name": "ls - list", "practice": [
                {"task": "List files", "solution": "ls", "difficulty": 1,
                 "error_simulation": [{"wrong_input": "dir", "message": "That is the DOS name."}]},
                {"task": "Long listing", "solution": "ls -l", "difficulty": 2,
                 "explanation": "-l is the long format."}
            ]}
        }}
    }"#;

    fn setup() -> (PracticeService, ProgressService, SessionContext) {
        let catalog: Arc<Catalog> = Arc::new(serde_json::from_str(CATALOG).unwrap());
        let mut progress = ProgressService::load(
            fixed_clock(),
            Arc::clone(&catalog),
            Arc::new(InMemoryRepository::new()),
            EventLog::in_memory(fixed_clock()),
        )
        .unwrap();
        let ctx = SessionContext::start("bob", "Guest", fixed_clock());
        progress.sign_in(ctx.user()).unwrap();
        (PracticeService::with_seed(catalog, 42), progress, ctx)
    }

    fn ready(next: NextTask) -> Task {
        match next {
            NextTask::Ready { task, .. } => task,
            NextTask::Exhausted => panic!("expected a task"),
        }
    }

    #[test]
    fn walks_tiers_until_exhausted() {
        let (mut practice, mut progress, ctx) = setup();

        let first = ready(practice.next_task("1", "1", &BTreeSet::new()).unwrap());
        assert_eq!(first.task, "List files");
        let outcome = practice.submit(&ctx, &mut progress, &first, "  LS ").unwrap();
        assert!(outcome.verdict.is_correct());
        let recorded = outcome.recorded.unwrap();
        assert_eq!(recorded.unlocked[0].id, AchievementId::FirstSteps);

        let done = progress.record("bob").unwrap().completed_tasks().clone();
        let second = ready(practice.next_task("1", "1", &done).unwrap());
        assert_eq!(second.task, "Long listing");
        let outcome = practice.submit(&ctx, &mut progress, &second, "ls -l").unwrap();
        assert_eq!(outcome.explanation.as_deref(), Some("-l is the long format."));

        let done = progress.record("bob").unwrap().completed_tasks().clone();
        assert_eq!(practice.next_task("1", "1", &done).unwrap(), NextTask::Exhausted);
    }

    #[test]
    fn wrong_answer_is_counted_and_audited() {
        let (mut practice, mut progress, ctx) = setup();
        let task = ready(practice.next_task("1", "1", &BTreeSet::new()).unwrap());

        let outcome = practice.submit(&ctx, &mut progress, &task, "DIR").unwrap();
        assert!(!outcome.verdict.is_correct());
        assert!(outcome.recorded.is_none());

        let record = progress.record("bob").unwrap();
        assert!(record.completed_tasks().is_empty());
        assert_eq!(record.session_stats().total_attempts, 1);
        assert_eq!(record.session_stats().correct_answers, 0);

        let warnings: Vec<_> = progress
            .log()
            .entries()
            .into_iter()
            .filter(|e| e.category == Category::Warning)
            .map(|e| e.message)
            .collect();
        assert_eq!(
            warnings,
            [
                "Known mistake triggered: dir",
                "Incorrect answer. User: 'DIR', expected: 'ls'"
            ]
        );
    }

    #[test]
    fn unknown_command_is_reported() {
        let (mut practice, _, _) = setup();
        let err = practice.next_task("1", "9", &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, PracticeError::UnknownCommand { .. }));
        let err = practice.next_task("7", "1", &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, PracticeError::UnknownModule(_)));
    }
}
