use storage::EventLog;
use trainer_core::evaluator::{Verdict, evaluate};
use trainer_core::model::{Catalog, Scenario, ScenarioStep};

use crate::error::ScenarioError;
use crate::practice::audit_verdict;
use crate::progress_service::{ProgressService, Recorded};
use crate::session_context::SessionContext;

/// Result of a free answer to the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step is done; the session moved on.
    Correct { explanation: Option<String> },
    /// The step stays current.
    Incorrect { verdict: Verdict },
}

/// A linear walk through a scenario's steps.
///
/// Skipped steps still count towards completion; finishing the last step
/// records the scenario either way.
#[derive(Debug, Clone)]
pub struct ScenarioSession {
    scenario: Scenario,
    current: usize,
    skipped: usize,
}

impl ScenarioSession {
    /// Start the scenario listed under menu key `key`.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError::UnknownScenario` if there is no such key.
    pub fn start(catalog: &Catalog, key: &str) -> Result<Self, ScenarioError> {
        let scenario = catalog
            .scenario(key)
            .ok_or_else(|| ScenarioError::UnknownScenario(key.to_owned()))?;
        Ok(Self {
            scenario: scenario.clone(),
            current: 0,
            skipped: 0,
        })
    }

    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    #[must_use]
    pub fn current_step(&self) -> Option<&ScenarioStep> {
        self.scenario.steps.get(self.current)
    }

    /// 1-based number of the current step.
    #[must_use]
    pub fn position(&self) -> usize {
        self.current + 1
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.scenario.steps.len()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current >= self.scenario.steps.len()
    }

    /// Hint for the current step. Does not advance.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError::Completed` once every step is done.
    pub fn hint(&self) -> Result<&str, ScenarioError> {
        self.current_step()
            .map(|step| step.hint.as_str())
            .ok_or(ScenarioError::Completed)
    }

    /// Give up on the current step and return its solution.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError::Completed` once every step is done.
    pub fn skip(&mut self, ctx: &SessionContext, log: &EventLog) -> Result<String, ScenarioError> {
        let solution = self
            .current_step()
            .map(|step| step.solution.clone())
            .ok_or(ScenarioError::Completed)?;
        log.info(
            ctx.user(),
            format!(
                "Scenario '{}': step {} skipped.",
                self.scenario.id,
                self.position()
            ),
        );
        self.current += 1;
        self.skipped += 1;
        Ok(solution)
    }

    /// Check a free answer to the current step. Catalogued mistakes do not
    /// apply to scenario steps; only the generic hints do.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError::Completed` once every step is done, or
    /// `ScenarioError::Progress` if the attempt cannot be stored.
    pub fn answer(
        &mut self,
        ctx: &SessionContext,
        progress: &mut ProgressService,
        answer: &str,
    ) -> Result<StepOutcome, ScenarioError> {
        let step = self.current_step().ok_or(ScenarioError::Completed)?;
        let verdict = evaluate(answer, &step.solution, &[]);
        audit_verdict(progress.log(), ctx.user(), answer, &step.solution, &verdict);
        progress.record_attempt(ctx.user(), verdict.is_correct())?;

        if !verdict.is_correct() {
            return Ok(StepOutcome::Incorrect { verdict });
        }
        let explanation = step.explanation.clone();
        self.current += 1;
        Ok(StepOutcome::Correct { explanation })
    }

    /// Record the scenario as completed.
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError::Unfinished` if steps remain, or
    /// `ScenarioError::Progress` if the store cannot be updated.
    pub fn finish(
        self,
        ctx: &SessionContext,
        progress: &mut ProgressService,
    ) -> Result<Recorded, ScenarioError> {
        if !self.is_complete() {
            return Err(ScenarioError::Unfinished {
                remaining: self.total() - self.current,
            });
        }
        Ok(progress.record_scenario_complete(ctx.user(), &self.scenario.id)?)
    }
}
