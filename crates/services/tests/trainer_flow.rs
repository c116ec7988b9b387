use std::fs;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use services::{
    Clock, FileReportSink, NoopReportSink, SignIn, TestSession, TrainerConfig, TrainerServices,
};
use storage::{EventLog, JsonProgressStore, ProgressRepository, Storage};
use tempfile::tempdir;
use trainer_core::model::{AchievementId, Catalog};
use trainer_core::time::fixed_clock;

const CATALOG: &str = r#"{
    "1": {"name": "Basics", "commands": {
        "1": {"name": "ls - list directory contents", "practice": [
            {"task": "List files", "solution": "ls"},
            {"task": "Long listing", "solution": "ls -l", "difficulty": 2}
        ]}
    }},
    "tests": {
        "1": {"questions": [
            {"question": "Which command lists files?", "options": ["cd", "ls", "pwd"], "correct": 1,
             "explanation": "ls lists directory contents."}
        ]}
    }
}"#;

fn catalog() -> Catalog {
    serde_json::from_str(CATALOG).unwrap()
}

fn in_memory_services() -> TrainerServices {
    TrainerServices::from_parts(
        catalog(),
        Storage::in_memory(),
        EventLog::in_memory(fixed_clock()),
        Arc::new(NoopReportSink),
        fixed_clock(),
    )
    .unwrap()
}

#[test]
fn new_user_aces_level_one_and_unlocks_test_champion() {
    let mut services = in_memory_services();
    let session = services.start_session("Алиса").unwrap();
    assert_eq!(session.sign_in, SignIn::Created);

    let mut test = TestSession::start(&services.catalog, "1").unwrap();
    // option 2 on screen is index 1
    assert!(test.answer(2).unwrap().correct);
    let outcome = test.finish(&session.ctx, &mut services.progress).unwrap();

    assert_eq!(outcome.score, 100.0);
    let unlocked: Vec<_> = outcome.recorded.unlocked.iter().map(|a| a.id).collect();
    assert_eq!(unlocked, [AchievementId::TestChampion]);

    let record = services.progress.record("Алиса").unwrap();
    assert_eq!(record.test_results()["1"].score, 100.0);
    assert!(record.has_achievement(AchievementId::TestChampion));
}

#[test]
fn aborted_test_records_nothing() {
    let mut services = in_memory_services();
    let session = services.start_session("bob").unwrap();

    let mut test = TestSession::start(&services.catalog, "1").unwrap();
    assert!(test.answer(5).is_err());
    let partial = test.abort();
    assert_eq!(partial.answered, 0);

    let record = services.progress.record(session.ctx.user()).unwrap();
    assert!(record.test_results().is_empty());
}

#[test]
fn progress_survives_restart_through_json_file() {
    let dir = tempdir().unwrap();
    let catalog_path = dir.path().join("training_data.json");
    fs::write(&catalog_path, CATALOG).unwrap();
    let config = TrainerConfig {
        catalog_path,
        progress_path: dir.path().join("user_progress.json"),
        log_path: Some(dir.path().join("training_log.txt")),
        report_dir: Some(dir.path().join("reports")),
        ..TrainerConfig::default()
    };

    {
        let mut services = TrainerServices::bootstrap(&config, fixed_clock()).unwrap();
        let session = services.start_session("bob").unwrap();
        services
            .progress
            .record_task_complete("bob", "List files")
            .unwrap();
        services.end_session(&session).unwrap();
    }

    let next_day = Clock::fixed(fixed_clock().now() + Duration::days(1));
    let mut services = TrainerServices::bootstrap(&config, next_day).unwrap();
    let session = services.start_session("bob").unwrap();
    assert_eq!(session.sign_in, SignIn::Returning);

    let record = services.progress.record("bob").unwrap();
    assert!(record.is_task_completed("List files"));
    assert_eq!(record.achievements(), &[AchievementId::FirstSteps]);
    assert_eq!(
        record.session_stats().sessions[0].date,
        NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()
    );

    let log = fs::read_to_string(dir.path().join("training_log.txt")).unwrap();
    assert!(log.contains("[SUCCESS] [bob] Created new profile for bob"));
    assert!(log.contains("[INFO] [bob] Welcome back, bob!"));

    let reports: Vec<_> = fs::read_dir(dir.path().join("reports")).unwrap().collect();
    assert_eq!(reports.len(), 1);
}

#[test]
fn five_daily_logins_unlock_persistent_student_on_next_action() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("user_progress.json");
    let mut clock = fixed_clock();

    for _ in 0..5 {
        let mut services = TrainerServices::from_parts(
            catalog(),
            Storage::json(&path),
            EventLog::in_memory(clock),
            Arc::new(NoopReportSink),
            clock,
        )
        .unwrap();
        services.start_session("carol").unwrap();
        clock.advance(Duration::days(1));
    }

    let mut services = TrainerServices::from_parts(
        catalog(),
        Storage::json(&path),
        EventLog::in_memory(clock),
        Arc::new(NoopReportSink),
        clock,
    )
    .unwrap();
    services.start_session("carol").unwrap();
    let recorded = services
        .progress
        .record_task_complete("carol", "List files")
        .unwrap();
    let unlocked: Vec<_> = recorded.unlocked.iter().map(|a| a.id).collect();
    assert_eq!(
        unlocked,
        [AchievementId::FirstSteps, AchievementId::PersistentStudent]
    );

    let stored = JsonProgressStore::new(&path).load_all().unwrap();
    assert_eq!(stored["carol"].session_stats().sessions.len(), 5);
}

#[test]
fn file_report_sink_writes_summary() {
    let dir = tempdir().unwrap();
    let mut services = TrainerServices::from_parts(
        catalog(),
        Storage::in_memory(),
        EventLog::in_memory(fixed_clock()),
        Arc::new(FileReportSink::new(dir.path())),
        fixed_clock(),
    )
    .unwrap();
    let session = services.start_session("dave").unwrap();
    services.end_session(&session).unwrap();

    let entry = fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap();
    let body = fs::read_to_string(entry.path()).unwrap();
    assert!(body.contains("user:     dave"));
    assert!(body.contains("reason:   normal exit"));
}
