use std::io::{BufRead, Write};

use services::{SignIn, StartedSession};

use crate::error::ShellError;
use crate::terminal::Terminal;

/// Top-level destinations of the main menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Guidance,
    Modules,
    Scenarios,
    Tests,
    Progress,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Guidance,
        Screen::Modules,
        Screen::Scenarios,
        Screen::Tests,
        Screen::Progress,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Screen::Guidance => "1",
            Screen::Modules => "2",
            Screen::Scenarios => "3",
            Screen::Tests => "4",
            Screen::Progress => "5",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Screen::Guidance => "Getting started",
            Screen::Modules => "Training modules",
            Screen::Scenarios => "Practical scenarios",
            Screen::Tests => "Knowledge tests",
            Screen::Progress => "My progress",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

/// # Errors
///
/// Returns `ShellError` if the terminal fails or input ends.
pub fn ask_name<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    default_user: &str,
) -> Result<String, ShellError> {
    term.clear()?;
    term.line(term.palette().heading("=== Command line trainer ==="))?;
    term.prompt(&format!("Enter your name (empty for {default_user}): "))
}

#[must_use]
pub fn greeting(session: &StartedSession) -> String {
    let user = session.ctx.user();
    match session.sign_in {
        SignIn::Created => format!("Welcome, {user}! A new profile has been created."),
        SignIn::Returning => format!("Welcome back, {user}!"),
    }
}

/// # Errors
///
/// Returns `ShellError::Io` if the terminal cannot be written.
pub fn render<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    user: &str,
    notice: Option<&str>,
) -> Result<(), ShellError> {
    let p = term.palette();
    term.clear()?;
    term.line(p.heading("=== Command line trainer ==="))?;
    term.line(format!("User: {}", p.accent(user)))?;
    if let Some(notice) = notice {
        term.line(p.success(notice))?;
    }
    term.blank()?;
    for screen in Screen::ALL {
        term.line(format!("{}. {}", screen.key(), screen.title()))?;
    }
    term.line("0. Exit")
}
