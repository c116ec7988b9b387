use std::io::{BufRead, Write};

use crate::error::ShellError;
use crate::terminal::Terminal;

const INTRO: &[&str] = &[
    "This trainer teaches everyday shell commands through practice.",
    "",
    "Training modules group related commands. Each command has a short theory",
    "page and practice tasks ordered from easy to hard. Type the command you",
    "would run; spacing and letter case do not matter.",
    "",
    "Scenarios chain several commands into one realistic job. Type 'help' at",
    "any step for a hint or 'skip' to see the solution.",
    "",
    "Tests are multiple choice. Answer with the option number, or 0 to stop.",
    "",
    "Type 0 in any menu to go back.",
];

const REFERENCE: &[&str] = &[
    "man <command>      full manual page, e.g. 'man ls' (q to quit)",
    "<command> --help   short usage summary, e.g. 'ls --help'",
    "apropos <word>     search manual pages by keyword",
];

/// # Errors
///
/// Returns `ShellError` if the terminal fails or input ends.
pub fn run<R: BufRead, W: Write>(term: &mut Terminal<R, W>) -> Result<(), ShellError> {
    let p = term.palette();
    term.clear()?;
    term.line(p.heading("=== Getting started ==="))?;
    for line in INTRO {
        term.line(line)?;
    }
    term.blank()?;
    term.line(p.heading("Where to look things up"))?;
    for line in REFERENCE {
        term.line(format!("  {}", p.accent(line)))?;
    }
    term.wait_for_enter()
}
