#![forbid(unsafe_code)]

pub mod catalog;
pub mod event_log;
pub mod json;
pub mod repository;

pub use catalog::{CatalogLoadError, load_catalog, parse_catalog};
pub use event_log::{Category, EventLog, LogEntry};
pub use json::JsonProgressStore;
pub use repository::{InMemoryRepository, ProgressMap, ProgressRepository, Storage, StorageError};
