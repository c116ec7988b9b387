use std::io::{BufRead, Write};
use std::sync::Arc;

use services::{SessionContext, TrainerServices};

use crate::error::ShellError;
use crate::input::MenuInput;
use crate::terminal::Terminal;
use crate::views::{invalid_choice, practice};
use crate::vm::map_command_rows;

/// Module menu, then command menu, then command detail.
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
        term.line(p.heading("=== Training modules ==="))?;
        if catalog.modules().is_empty() {
            term.line("No training modules are available yet.")?;
            return term.wait_for_enter();
        }
        for (id, module) in catalog.modules() {
            term.line(format!("{id}. {}", module.name))?;
        }
        term.line("0. Back")?;

        match MenuInput::parse(&term.prompt("\nChoose a module: ")?) {
            MenuInput::Back => return Ok(()),
            MenuInput::Select(id) if catalog.module(&id).is_some() => {
                commands(term, services, ctx, &id)?;
            }
            MenuInput::Select(_) => invalid_choice(term)?,
        }
    }
}

fn commands<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    services: &mut TrainerServices,
    ctx: &SessionContext,
    module_id: &str,
) -> Result<(), ShellError> {
    let catalog = Arc::clone(&services.catalog);
    let Some(module) = catalog.module(module_id) else {
        return Ok(());
    };
    let rows = map_command_rows(module);
    let p = term.palette();
    loop {
        term.clear()?;
        term.line(p.heading(format!("=== {} ===", module.name)))?;
        for row in &rows {
            let subtitle = row
                .subtitle
                .as_deref()
                .map(|s| format!(" - {s}"))
                .unwrap_or_default();
            term.line(format!("{}. {}{subtitle}", row.id, p.accent(&row.title)))?;
            term.line(p.muted(format!(
                "   difficulty {}  tasks: {}",
                row.stars, row.task_count
            )))?;
        }
        term.line("0. Back")?;

        match MenuInput::parse(&term.prompt("\nChoose a command: ")?) {
            MenuInput::Back => return Ok(()),
            MenuInput::Select(id) if module.commands.contains_key(&id) => {
                detail(term, services, ctx, module_id, &id)?;
            }
            MenuInput::Select(_) => invalid_choice(term)?,
        }
    }
}

fn detail<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    services: &mut TrainerServices,
    ctx: &SessionContext,
    module_id: &str,
    command_id: &str,
) -> Result<(), ShellError> {
    let catalog = Arc::clone(&services.catalog);
    let Some(command) = catalog.command(module_id, command_id) else {
        return Ok(());
    };
    let p = term.palette();
    loop {
        term.clear()?;
        term.line(p.heading(format!("=== {} ===", command.name)))?;
        for (title, body) in [
            ("Theory", &command.theory),
            ("When it is useful", &command.when_useful),
            ("Parameters", &command.params),
        ] {
            if !body.is_empty() {
                term.blank()?;
                term.line(p.accent(format!("{title}:")))?;
                term.line(body)?;
            }
        }
        term.blank()?;
        term.line("1. Practice")?;
        term.line("0. Back")?;

        match MenuInput::parse(&term.prompt("\nChoose an action: ")?) {
            MenuInput::Back => return Ok(()),
            MenuInput::Select(action) if action == "1" => {
                practice::run(term, services, ctx, module_id, command_id)?;
            }
            MenuInput::Select(_) => invalid_choice(term)?,
        }
    }
}
