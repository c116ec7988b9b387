use std::io::{BufRead, Write};
use std::sync::Arc;

use services::{ScenarioSession, SessionContext, StepOutcome, TrainerServices};

use crate::error::ShellError;
use crate::input::{MenuInput, StepInput};
use crate::terminal::Terminal;
use crate::views::{invalid_choice, show_failure, show_unlocked, verdict_line};
use crate::vm::stars;

const STEP_PROMPT: &str = "Your command ('help' for a hint, 'skip' to skip): ";

/// Scenario menu and step-by-step play.
///
/// # Errors
///
/// Returns `ShellError` if the terminal fails or input ends.
pub fn run<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    services: &mut TrainerServices,
    ctx: &SessionContext,
) -> Result<(), ShellError> {
    let catalog = Arc::clone(&services.catalog);
    let p = term.palette();
    loop {
        term.clear()?;
        term.line(p.heading("=== Practical scenarios ==="))?;
        if catalog.scenarios().is_empty() {
            term.line("No scenarios have been added yet.")?;
            return term.wait_for_enter();
        }

        let done = services
            .progress
            .record(ctx.user())
            .map(|r| r.completed_scenarios().clone())
            .unwrap_or_default();
        for (key, scenario) in catalog.scenarios() {
            let mark = if done.contains(&scenario.id) {
                p.success("[✓]")
            } else {
                "[ ]".to_owned()
            };
            term.line(format!("{key}. {mark} {}", scenario.name))?;
            if !scenario.description.is_empty() {
                term.line(format!("   {}", scenario.description))?;
            }
            term.line(p.muted(format!(
                "   difficulty {}",
                stars(scenario.difficulty.max(1))
            )))?;
        }
        term.line("0. Back")?;

        match MenuInput::parse(&term.prompt("\nChoose a scenario: ")?) {
            MenuInput::Back => return Ok(()),
            MenuInput::Select(key) => match ScenarioSession::start(&catalog, &key) {
                Ok(session) => play(term, services, ctx, session)?,
                Err(_) => invalid_choice(term)?,
            },
        }
    }
}

fn play<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    services: &mut TrainerServices,
    ctx: &SessionContext,
    mut session: ScenarioSession,
) -> Result<(), ShellError> {
    let p = term.palette();
    let name = session.scenario().name.clone();

    term.clear()?;
    term.line(p.heading(format!("=== {name} ===")))?;
    term.line(&session.scenario().description)?;
    term.line(format!("Difficulty: {}/5", session.scenario().difficulty))?;

    while let Some(step) = session.current_step().cloned() {
        term.blank()?;
        term.line(p.accent(format!(
            "Step {} of {}:",
            session.position(),
            session.total()
        )))?;
        term.line(&step.task)?;

        loop {
            match StepInput::parse(&term.prompt(STEP_PROMPT)?) {
                StepInput::Help => term.line(p.warning(format!("Hint: {}", step.hint)))?,
                StepInput::Skip => {
                    match session.skip(ctx, services.progress.log()) {
                        Ok(solution) => {
                            term.line(p.muted(format!("Step skipped. Solution: {solution}")))?;
                        }
                        Err(err) => return show_failure(term, &err),
                    }
                    break;
                }
                StepInput::Answer(answer) => {
                    match session.answer(ctx, &mut services.progress, &answer) {
                        Ok(StepOutcome::Correct { explanation }) => {
                            term.line(p.success("Correct!"))?;
                            if let Some(explanation) = explanation {
                                term.line(format!("Explanation: {explanation}"))?;
                            }
                            break;
                        }
                        Ok(StepOutcome::Incorrect { verdict }) => {
                            term.line(verdict_line(p, &verdict))?;
                            term.line(p.muted("Type 'help' for a hint or try again."))?;
                        }
                        Err(err) => return show_failure(term, &err),
                    }
                }
            }
        }
    }

    match session.finish(ctx, &mut services.progress) {
        Ok(recorded) => {
            term.blank()?;
            term.line(p.success(format!("Congratulations! Scenario '{name}' completed!")))?;
            show_unlocked(term, &recorded.unlocked)?;
            term.wait_for_enter()
        }
        Err(err) => show_failure(term, &err),
    }
}
