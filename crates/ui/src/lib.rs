#![forbid(unsafe_code)]

pub mod app;
pub mod error;
pub mod input;
pub mod palette;
pub mod terminal;
pub mod views;
pub mod vm;

pub use app::{Shell, ShellExit};
pub use error::ShellError;
pub use input::{ChoiceInput, MenuInput, StepInput};
pub use palette::Palette;
pub use terminal::Terminal;
pub use views::progress::write_report;
