#![forbid(unsafe_code)]

mod cli;

use std::io::{self, IsTerminal};
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Command};
use services::{Clock, ExitReason, SessionFinalizer, TrainerServices};
use storage::load_catalog;
use ui::{Palette, Shell, ShellError, ShellExit, Terminal, write_report};

/// Conventional status for a process stopped by SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command.clone().unwrap_or(Command::Run) {
        Command::Run => run_interactive(&cli).await,
        Command::Stats { user } => print_stats(&cli, &user),
        Command::CheckCatalog => check_catalog(&cli.catalog),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

async fn run_interactive(cli: &Cli) -> Result<ExitCode> {
    let services = TrainerServices::bootstrap(&cli.config(), Clock::default())
        .context("could not start the trainer")?;
    let preset = cli.user.clone();
    let colored = io::stdout().is_terminal();

    // Filled once the user has signed in; the interrupt path needs it.
    let finalizer: Arc<OnceLock<Arc<SessionFinalizer>>> = Arc::default();
    let pre_sign_in = services.pre_sign_in_finalizer();
    let shell_finalizer = Arc::clone(&finalizer);

    let mut shell = tokio::task::spawn_blocking(move || -> Result<ShellExit, ShellError> {
        let mut term = Terminal::new(io::stdin().lock(), io::stdout());
        if colored {
            term = term.interactive();
        }
        let mut shell = Shell::new(term, services);
        let session = shell.sign_in(preset.as_deref())?;
        let _ = shell_finalizer.set(Arc::clone(&session.finalizer));
        let (exit, _summary) = shell.run_session(&session)?;
        Ok(exit)
    });

    tokio::select! {
        joined = &mut shell => {
            let exit = joined.context("interactive shell stopped unexpectedly")??;
            info!(?exit, "trainer closed");
            Ok(ExitCode::SUCCESS)
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("could not listen for Ctrl+C")?;
            let active = finalizer.get().unwrap_or_else(|| {
                warn!("interrupted before sign-in");
                &pre_sign_in
            });
            active.finish(ExitReason::Interrupted);
            eprintln!("\nInterrupted. Saved progress is kept.");
            // The shell thread is blocked on stdin and would hold the runtime open.
            std::process::exit(i32::from(EXIT_INTERRUPTED));
        }
    }
}

fn print_stats(cli: &Cli, user: &str) -> Result<ExitCode> {
    let mut config = cli.config();
    config.log_path = None;
    let services = TrainerServices::bootstrap(&config, Clock::default())
        .context("could not load progress")?;
    let Some(report) = services.progress.report(user) else {
        bail!("no progress recorded for '{user}'");
    };

    let palette = Palette::new(io::stdout().is_terminal());
    write_report(&mut io::stdout().lock(), palette, user, &report)
        .context("could not print the report")?;
    Ok(ExitCode::SUCCESS)
}

fn check_catalog(path: &Path) -> Result<ExitCode> {
    let catalog = load_catalog(path)
        .with_context(|| format!("catalog {} is not usable", path.display()))?;

    println!(
        "{}: {} modules, {} distinct tasks, {} test levels, {} scenarios",
        path.display(),
        catalog.modules().len(),
        catalog.all_task_keys().len(),
        catalog.tests().len(),
        catalog.scenarios().len()
    );
    let shared = catalog.duplicate_task_keys();
    if !shared.is_empty() {
        println!(
            "{} task texts are used by more than one task and share progress:",
            shared.len()
        );
        for key in shared {
            println!("  {key}");
        }
    }
    Ok(ExitCode::SUCCESS)
}
