use std::io::{self, BufRead, Write};

use services::{SessionContext, TrainerServices};
use trainer_core::stats::ProgressReport;

use crate::error::ShellError;
use crate::palette::Palette;
use crate::terminal::Terminal;
use crate::vm::{
    BAR_WIDTH, band_label, band_tone, format_datetime, format_duration, level_title,
    map_progress_bar,
};

/// # Errors
///
/// Returns `ShellError` if the terminal fails or input ends.
pub fn run<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    services: &TrainerServices,
    ctx: &SessionContext,
) -> Result<(), ShellError> {
    let p = term.palette();
    term.clear()?;
    match services.progress.report(ctx.user()) {
        Some(report) => write_report(term.output(), p, ctx.user(), &report)?,
        None => term.line("No progress recorded yet.")?,
    }
    term.wait_for_enter()
}

/// Render the full progress report. Shared by the interactive view and the
/// `stats` subcommand.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_report(
    out: &mut impl Write,
    p: Palette,
    user: &str,
    report: &ProgressReport,
) -> io::Result<()> {
    writeln!(out, "{}", p.heading(format!("=== Progress: {user} ===")))?;

    writeln!(out, "\n{}", p.heading("Overall"))?;
    match report.overall.percent() {
        Some(percent) => {
            writeln!(out, "{}", p.bar(&map_progress_bar(percent, BAR_WIDTH)))?;
            writeln!(
                out,
                "Tasks completed: {}/{}",
                report.overall.completed, report.overall.total
            )?;
        }
        None => writeln!(out, "The catalog has no practice tasks yet.")?,
    }

    writeln!(out, "\n{}", p.heading("Tests"))?;
    if report.tests.is_empty() {
        writeln!(out, "No tests taken yet.")?;
    }
    for test in &report.tests {
        writeln!(
            out,
            "{} {}",
            level_title(&test.level, test.name.as_deref()),
            p.muted(format!("({})", format_datetime(test.completed_at)))
        )?;
        writeln!(out, "  {}", p.bar(&map_progress_bar(test.score, BAR_WIDTH)))?;
        writeln!(out, "  {}", p.tone(band_label(test.band), band_tone(test.band)))?;
    }

    writeln!(out, "\n{}", p.heading("Modules"))?;
    for module in &report.modules {
        let percent = module.completion.percent().unwrap_or_default();
        writeln!(
            out,
            "{} {}/{}",
            p.accent(&module.name),
            module.completion.completed,
            module.completion.total
        )?;
        writeln!(out, "  {}", p.bar(&map_progress_bar(percent, BAR_WIDTH)))?;
        for command in &module.commands {
            let mark = if command.completion.is_full() { "✓" } else { " " };
            writeln!(
                out,
                "  {mark} {}: {}/{}",
                command.name, command.completion.completed, command.completion.total
            )?;
        }
    }

    let scenarios = &report.scenarios;
    writeln!(
        out,
        "\n{} {}/{}",
        p.heading("Scenarios"),
        scenarios.completion.completed,
        scenarios.completion.total
    )?;
    for name in &scenarios.completed_names {
        writeln!(out, "  {} {name}", p.success("✓"))?;
    }

    writeln!(out, "\n{}", p.heading("Achievements"))?;
    if report.achievements.is_empty() {
        writeln!(out, "No achievements yet. Keep training!")?;
    }
    for achievement in &report.achievements {
        writeln!(
            out,
            "  🏆 {} - {}",
            p.success(achievement.name),
            achievement.description
        )?;
    }

    writeln!(out, "\n{}", p.heading("Statistics"))?;
    writeln!(out, "First login:    {}", format_datetime(report.first_login))?;
    writeln!(out, "Last login:     {}", format_datetime(report.last_login))?;
    if let Some(rate) = report.success_rate {
        writeln!(
            out,
            "Success rate:   {rate:.1}% ({}/{})",
            report.correct_answers, report.total_attempts
        )?;
    }
    writeln!(out, "Sessions:       {}", report.session_count)?;
    writeln!(out, "Current streak: {} day(s)", report.current_streak)?;
    writeln!(out, "Time trained:   {}", format_duration(report.total_time))?;
    Ok(())
}
