use std::io::{BufRead, Write};

use services::{NextTask, SessionContext, TrainerServices};

use crate::error::ShellError;
use crate::terminal::Terminal;
use crate::views::{show_failure, show_unlocked, verdict_line};
use crate::vm::stars;

/// Serve one task for a command and check the answer.
///
/// # Errors
///
/// Returns `ShellError` if the terminal fails or input ends. Service failures
/// are shown and swallowed.
pub fn run<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    services: &mut TrainerServices,
    ctx: &SessionContext,
    module_id: &str,
    command_id: &str,
) -> Result<(), ShellError> {
    let p = term.palette();
    let completed = services
        .progress
        .record(ctx.user())
        .map(|record| record.completed_tasks().clone())
        .unwrap_or_default();

    let (task, difficulty) = match services.practice.next_task(module_id, command_id, &completed) {
        Ok(NextTask::Ready { task, difficulty }) => (task, difficulty),
        Ok(NextTask::Exhausted) => {
            term.blank()?;
            term.line(p.success("You have completed every task for this command!"))?;
            return term.wait_for_enter();
        }
        Err(err) => return show_failure(term, &err),
    };

    term.blank()?;
    term.line(p.heading("Practice"))?;
    term.line(format!("Difficulty: {}", p.warning(stars(difficulty.max(1)))))?;
    term.line(format!("Task: {}", task.task))?;
    let answer = term.prompt("Your answer: ")?;

    match services
        .practice
        .submit(ctx, &mut services.progress, &task, &answer)
    {
        Ok(outcome) => {
            term.line(verdict_line(p, &outcome.verdict))?;
            if let Some(explanation) = &outcome.explanation {
                term.line(format!("Explanation: {explanation}"))?;
            }
            if let Some(recorded) = &outcome.recorded {
                show_unlocked(term, &recorded.unlocked)?;
            }
            term.wait_for_enter()
        }
        Err(err) => show_failure(term, &err),
    }
}
