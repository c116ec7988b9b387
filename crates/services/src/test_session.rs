use tracing::debug;

use trainer_core::model::{Catalog, Question};
use trainer_core::stats::ScoreBand;

use crate::error::TestSessionError;
use crate::progress_service::{ProgressService, Recorded};
use crate::session_context::SessionContext;

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// Feedback for one answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub correct_option: String,
    pub explanation: String,
}

/// Where a test stood when the user quit. Nothing is recorded for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialResult {
    pub answered: usize,
    pub correct: usize,
    pub total: usize,
}

impl PartialResult {
    /// Share of correct answers among the answered ones.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> Option<f64> {
        (self.answered > 0).then(|| self.correct as f64 / self.answered as f64 * 100.0)
    }
}

#[derive(Debug, Clone)]
pub struct TestOutcome {
    pub level: String,
    pub correct: usize,
    pub total: usize,
    pub score: f64,
    pub band: ScoreBand,
    pub recorded: Recorded,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One run through a test level's questions, in catalog order.
///
/// Options are chosen by their 1-based number as shown on screen.
#[derive(Debug, Clone)]
pub struct TestSession {
    level: String,
    name: Option<String>,
    questions: Vec<Question>,
    current: usize,
    correct: usize,
}

impl TestSession {
    /// # Errors
    ///
    /// Returns `TestSessionError::UnknownLevel` if the catalog has no such
    /// level, or `TestSessionError::NoQuestions` if it is empty.
    pub fn start(catalog: &Catalog, level: &str) -> Result<Self, TestSessionError> {
        let test = catalog
            .test_level(level)
            .ok_or_else(|| TestSessionError::UnknownLevel(level.to_owned()))?;
        if test.questions.is_empty() {
            return Err(TestSessionError::NoQuestions(level.to_owned()));
        }
        Ok(Self {
            level: level.to_owned(),
            name: test.name.clone(),
            questions: test.questions.clone(),
            current: 0,
            correct: 0,
        })
    }

    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.current
    }

    /// 1-based number of the question being asked.
    #[must_use]
    pub fn position(&self) -> usize {
        self.current + 1
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current >= self.questions.len()
    }

    /// Answer the current question with option number `choice` (1-based) and
    /// move to the next one.
    ///
    /// # Errors
    ///
    /// Returns `TestSessionError::ChoiceOutOfRange` for numbers outside the
    /// option list (the question stays current), or
    /// `TestSessionError::Completed` once every question is answered.
    pub fn answer(&mut self, choice: usize) -> Result<AnswerFeedback, TestSessionError> {
        let question = self
            .questions
            .get(self.current)
            .ok_or(TestSessionError::Completed)?;
        let options = question.options.len();
        if choice == 0 || choice > options {
            return Err(TestSessionError::ChoiceOutOfRange { choice, options });
        }

        let correct = choice - 1 == question.correct;
        let feedback = AnswerFeedback {
            correct,
            correct_option: question.correct_option().unwrap_or_default().to_owned(),
            explanation: question.explanation.clone(),
        };
        if correct {
            self.correct += 1;
        }
        self.current += 1;
        Ok(feedback)
    }

    /// Stop early. The partial result is for display only.
    #[must_use]
    pub fn abort(self) -> PartialResult {
        debug!(level = %self.level, answered = self.current, "test aborted");
        PartialResult {
            answered: self.current,
            correct: self.correct,
            total: self.questions.len(),
        }
    }

    /// Score the completed test and store it for the user.
    ///
    /// # Errors
    ///
    /// Returns `TestSessionError::Unfinished` if questions remain, or
    /// `TestSessionError::Progress` if the result cannot be stored.
    pub fn finish(
        self,
        ctx: &SessionContext,
        progress: &mut ProgressService,
    ) -> Result<TestOutcome, TestSessionError> {
        let total = self.questions.len();
        if !self.is_complete() {
            return Err(TestSessionError::Unfinished {
                answered: self.current,
                total,
            });
        }

        #[allow(clippy::cast_precision_loss)]
        let score = self.correct as f64 / total as f64 * 100.0;
        let recorded = progress.record_test_result(ctx.user(), &self.level, score)?;
        Ok(TestOutcome {
            level: self.level,
            correct: self.correct,
            total,
            score,
            band: ScoreBand::of(score),
            recorded,
        })
    }
}
