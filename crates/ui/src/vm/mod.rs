mod command_vm;
mod progress_bar;
mod score_vm;
mod time_fmt;

pub use command_vm::{CommandRowVm, map_command_rows, stars};
pub use progress_bar::{BAR_WIDTH, ProgressBarVm, Tone, map_progress_bar};
pub use score_vm::{band_label, band_tone, level_title};
pub use time_fmt::{format_datetime, format_duration};
