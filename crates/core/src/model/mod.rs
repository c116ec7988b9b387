mod catalog;
mod progress;
pub mod serde_fmt;

pub use catalog::{
    Catalog, CatalogError, CommandSpec, ErrorSimulation, Module, Question, Scenario, ScenarioStep,
    Task, TestLevel,
};
pub use progress::{
    AchievementId, ProgressError, ProgressRecord, SessionEntry, SessionStats, TestResult,
};
