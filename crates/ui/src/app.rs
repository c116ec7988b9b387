use std::io::{BufRead, Write};

use tracing::debug;

use services::{SessionSummary, StartedSession, TrainerServices};

use crate::error::ShellError;
use crate::input::MenuInput;
use crate::terminal::Terminal;
use crate::views::{self, guidance, home, knowledge_test, modules, progress, scenarios};
use crate::views::home::Screen;

/// How the main loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellExit {
    /// The user picked exit.
    Quit,
    /// Standard input ran out.
    InputClosed,
}

/// The interactive trainer: main menu plus every screen behind it.
pub struct Shell<R, W> {
    term: Terminal<R, W>,
    services: TrainerServices,
    notice: Option<String>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(term: Terminal<R, W>, services: TrainerServices) -> Self {
        Self {
            term,
            services,
            notice: None,
        }
    }

    #[must_use]
    pub fn services(&self) -> &TrainerServices {
        &self.services
    }

    pub fn into_parts(self) -> (Terminal<R, W>, TrainerServices) {
        (self.term, self.services)
    }

    /// Sign in `preset`, or ask for a name when there is none.
    ///
    /// # Errors
    ///
    /// Returns `ShellError` if input ends before a name is given or the new
    /// profile cannot be saved.
    pub fn sign_in(&mut self, preset: Option<&str>) -> Result<StartedSession, ShellError> {
        let name = match preset {
            Some(name) => name.to_owned(),
            None => home::ask_name(&mut self.term, self.services.default_user())?,
        };
        let session = self.services.start_session(&name)?;
        self.notice = Some(home::greeting(&session));
        Ok(session)
    }

    /// Run the main menu until the user exits or input ends.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::Io` if the terminal fails.
    pub fn run(&mut self, session: &StartedSession) -> Result<ShellExit, ShellError> {
        let ctx = &session.ctx;
        loop {
            home::render(&mut self.term, ctx.user(), self.notice.take().as_deref())?;
            let input = match self.term.prompt("\nChoose an option: ") {
                Ok(input) => input,
                Err(ShellError::InputClosed) => return Ok(closed()),
                Err(err) => return Err(err),
            };

            let screen = match MenuInput::parse(&input) {
                MenuInput::Back => {
                    self.services.log.info(ctx.user(), "User chose to exit.");
                    return Ok(ShellExit::Quit);
                }
                MenuInput::Select(key) => Screen::from_key(&key),
            };

            let term = &mut self.term;
            let result = match screen {
                Some(Screen::Guidance) => guidance::run(term),
                Some(Screen::Modules) => modules::run(term, &mut self.services, ctx),
                Some(Screen::Scenarios) => scenarios::run(term, &mut self.services, ctx),
                Some(Screen::Tests) => knowledge_test::run(term, &mut self.services, ctx),
                Some(Screen::Progress) => progress::run(term, &self.services, ctx),
                None => views::invalid_choice(term),
            };
            match result {
                Ok(()) => {}
                Err(ShellError::InputClosed) => return Ok(closed()),
                Err(err) => return Err(err),
            }
        }
    }

    /// Run the main loop, then close the session normally: store the
    /// session time, log the finish and deliver the report.
    ///
    /// The session is closed even when the loop fails.
    ///
    /// # Errors
    ///
    /// Returns the loop's `ShellError`, after the session has been closed.
    pub fn run_session(
        &mut self,
        session: &StartedSession,
    ) -> Result<(ShellExit, Option<SessionSummary>), ShellError> {
        let exit = self.run(session);
        let summary = self.services.end_session(session);
        let exit = exit?;
        let p = self.term.palette();
        self.term.blank()?;
        self.term.line(p.success("Goodbye! Your progress has been saved."))?;
        Ok((exit, summary))
    }
}

fn closed() -> ShellExit {
    debug!("input closed, leaving the main menu");
    ShellExit::InputClosed
}
