use std::io::Cursor;
use std::sync::Arc;

use services::{ExitReason, NoopReportSink, PracticeService, SignIn, TrainerServices};
use storage::{EventLog, Storage};
use trainer_core::model::{AchievementId, Catalog};
use trainer_core::time::fixed_clock;
use ui::{Shell, ShellExit, Terminal};

const CATALOG: &str = r#"{
    "1": {"name": "Basics", "commands": {
        "1": {"name": "ls - list directory contents",
              "theory": "ls prints directory entries.",
              "practice": [
                {"task": "List files", "solution": "ls"},
                {"task": "Long listing", "solution": "ls -l", "difficulty": 2}
              ]}
    }},
    "tests": {
        "1": {"name": "Beginner", "questions": [
            {"question": "Which command lists files?", "options": ["cd", "ls", "pwd"], "correct": 1,
             "explanation": "ls lists directory contents."}
        ]}
    },
    "scenarios": {
        "1": {"id": "cleanup", "name": "Cleanup", "description": "Tidy the home directory", "difficulty": 2,
              "steps": [
                {"task": "Go home", "hint": "tilde", "solution": "cd ~"},
                {"task": "Remove old", "hint": "recursive", "solution": "rm -r old"}
              ]}
    }
}"#;

type TestShell = Shell<Cursor<Vec<u8>>, Vec<u8>>;

fn shell(input: &str) -> TestShell {
    shell_bytes(input.as_bytes())
}

fn shell_bytes(input: &[u8]) -> TestShell {
    let catalog: Catalog = serde_json::from_str(CATALOG).unwrap();
    let services = TrainerServices::from_parts(
        catalog,
        Storage::in_memory(),
        EventLog::in_memory(fixed_clock()),
        Arc::new(NoopReportSink),
        fixed_clock(),
    )
    .unwrap();
    let practice = PracticeService::with_seed(Arc::clone(&services.catalog), 7);
    let term = Terminal::new(Cursor::new(input.to_vec()), Vec::new());
    Shell::new(term, services.with_practice(practice))
}

fn finish(shell: TestShell) -> (String, TrainerServices) {
    let (term, services) = shell.into_parts();
    (String::from_utf8(term.into_output()).unwrap(), services)
}

fn log_messages(services: &TrainerServices) -> Vec<String> {
    services.log.entries().into_iter().map(|e| e.message).collect()
}

#[test]
fn practice_task_then_progress_report() {
    let input = "Алиса\n2\n1\n1\n1\nls\n\n0\n0\n0\n5\n\n0\n";
    let mut shell = shell(input);
    let session = shell.sign_in(None).unwrap();
    assert_eq!(session.sign_in, SignIn::Created);

    let (exit, summary) = shell.run_session(&session).unwrap();
    assert_eq!(exit, ShellExit::Quit);
    assert_eq!(summary.unwrap().reason, ExitReason::Normal);

    let (out, services) = finish(shell);
    assert!(out.contains("Welcome, Алиса! A new profile has been created."));
    assert!(out.contains("ls prints directory entries."));
    assert!(out.contains("Task: List files"));
    assert!(out.contains("Correct!"));
    assert!(out.contains("Achievement unlocked: First steps"));
    assert!(out.contains("Tasks completed: 1/2"));
    assert!(out.contains("Goodbye!"));

    let record = services.progress.record("Алиса").unwrap();
    assert!(record.is_task_completed("List files"));
    assert!(record.has_achievement(AchievementId::FirstSteps));

    let log = log_messages(&services);
    assert!(log.iter().any(|m| m == "User chose to exit."));
    assert_eq!(log.last().map(String::as_str), Some("Session finished."));
}

#[test]
fn test_level_reprompts_on_bad_choices() {
    let input = "bob\n4\n1\n9\nabc\n2\n\n\n0\n0\n";
    let mut shell = shell(input);
    let session = shell.sign_in(None).unwrap();
    shell.run_session(&session).unwrap();

    let (out, services) = finish(shell);
    assert_eq!(out.matches("Enter a number from 1 to 3 or 0 to stop.").count(), 2);
    assert!(out.contains("Correct!"));
    assert!(out.contains("Excellent result!"));
    assert!(out.contains("Achievement unlocked: Test champion"));

    let record = services.progress.record("bob").unwrap();
    assert_eq!(record.test_results()["1"].score, 100.0);
}

#[test]
fn quitting_a_test_saves_nothing() {
    let input = "bob\n4\n1\nquit\n\n0\n0\n";
    let mut shell = shell(input);
    let session = shell.sign_in(None).unwrap();
    shell.run_session(&session).unwrap();

    let (out, services) = finish(shell);
    assert!(out.contains("No questions were answered."));
    assert!(services.progress.record("bob").unwrap().test_results().is_empty());
}

#[test]
fn scenario_with_hint_mistake_and_skip() {
    let input = "carol\n3\n1\nhelp\nsudo cd ~\ncd  ~\nskip\n\n0\n0\n";
    let mut shell = shell(input);
    let session = shell.sign_in(None).unwrap();
    shell.run_session(&session).unwrap();

    let (out, services) = finish(shell);
    assert!(out.contains("Hint: tilde"));
    assert!(out.contains("Superuser privileges (sudo) are not required here."));
    assert!(out.contains("Step skipped. Solution: rm -r old"));
    assert!(out.contains("Congratulations! Scenario 'Cleanup' completed!"));
    assert!(out.contains("1. [✓] Cleanup"));

    let record = services.progress.record("carol").unwrap();
    assert!(record.completed_scenarios().contains("cleanup"));
    assert_eq!(record.session_stats().total_attempts, 2);
    assert_eq!(record.session_stats().correct_answers, 1);

    let log = log_messages(&services);
    assert!(log.iter().any(|m| m == "Scenario 'cleanup': step 2 skipped."));
    assert!(log.iter().any(|m| m == "Scenario 'cleanup' completed."));
}

#[test]
fn end_of_input_still_closes_the_session() {
    let mut shell = shell("dave\n2\n");
    let session = shell.sign_in(None).unwrap();
    let (exit, summary) = shell.run_session(&session).unwrap();
    assert_eq!(exit, ShellExit::InputClosed);
    assert!(summary.is_some());
    assert!(session.finalizer.is_finished());
}

#[test]
fn blank_name_and_unknown_menu_key() {
    let mut shell = shell("\n7\n\n0\n");
    let session = shell.sign_in(None).unwrap();
    assert_eq!(session.ctx.user(), "Guest");
    shell.run_session(&session).unwrap();

    let (out, _) = finish(shell);
    assert!(out.contains("Invalid choice. Please try again."));
}

#[test]
fn preset_user_skips_the_name_prompt() {
    let mut shell = shell("0\n");
    let session = shell.sign_in(Some("erin")).unwrap();
    assert_eq!(session.ctx.user(), "erin");
    shell.run_session(&session).unwrap();

    let (out, _) = finish(shell);
    assert!(!out.contains("Enter your name"));
}

#[test]
fn undecodable_menu_input_is_just_an_invalid_choice() {
    let mut shell = shell_bytes(b"bob\n\xff\xfe\n\n0\n");
    let session = shell.sign_in(None).unwrap();

    let (exit, summary) = shell.run_session(&session).unwrap();
    assert_eq!(exit, ShellExit::Quit);
    assert_eq!(summary.unwrap().reason, ExitReason::Normal);

    let (out, _) = finish(shell);
    assert!(out.contains("Invalid choice. Please try again."));
    assert!(out.contains("Goodbye!"));
}
