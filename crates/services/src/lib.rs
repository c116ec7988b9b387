#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod practice;
pub mod progress_service;
pub mod report;
pub mod scenario_session;
pub mod session_context;
pub mod test_session;

pub use trainer_core::Clock;

pub use app_services::{StartedSession, TrainerConfig, TrainerServices};
pub use error::{
    BootstrapError, PracticeError, ProgressServiceError, ReportError, ScenarioError,
    TestSessionError,
};
pub use practice::{NextTask, PracticeOutcome, PracticeService, TaskSelector};
pub use progress_service::{ProgressService, Recorded, SignIn};
pub use report::{
    ExitReason, FileReportSink, NoopReportSink, ReportSink, SessionFinalizer, SessionSummary,
};
pub use scenario_session::{ScenarioSession, StepOutcome};
pub use session_context::{DEFAULT_USER, SessionContext};
pub use test_session::{AnswerFeedback, PartialResult, TestOutcome, TestSession};
