pub mod guidance;
pub mod home;
pub mod modules;
pub mod practice;
pub mod progress;
pub mod scenarios;

use std::error::Error;
use std::io::{BufRead, Write};

use tracing::error;

use trainer_core::achievements::Achievement;
use trainer_core::evaluator::Verdict;

use crate::error::ShellError;
use crate::palette::Palette;
use crate::terminal::Terminal;

/// Show a service failure and let the user carry on.
pub(crate) fn show_failure<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    err: &dyn Error,
) -> Result<(), ShellError> {
    error!(error = %err, "action failed");
    term.line(term.palette().error(format!("Error: {err}")))?;
    term.wait_for_enter()
}

pub(crate) fn invalid_choice<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
) -> Result<(), ShellError> {
    term.line(term.palette().warning("Invalid choice. Please try again."))?;
    term.wait_for_enter()
}

pub(crate) fn show_unlocked<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    unlocked: &[&'static Achievement],
) -> Result<(), ShellError> {
    let p = term.palette();
    for achievement in unlocked {
        term.line(p.success(format!(
            "🏆 Achievement unlocked: {} ({})",
            achievement.name, achievement.description
        )))?;
    }
    Ok(())
}

pub(crate) fn verdict_line(p: Palette, verdict: &Verdict) -> String {
    match verdict {
        Verdict::Correct => p.success(verdict),
        Verdict::Hint(_) => p.warning(verdict),
        Verdict::KnownMistake { .. } | Verdict::Reveal { .. } => p.error(verdict),
    }
}
