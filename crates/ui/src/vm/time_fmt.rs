use chrono::NaiveDateTime;
use trainer_core::model::serde_fmt::timestamp;

#[must_use]
pub fn format_datetime(value: NaiveDateTime) -> String {
    value.format(timestamp::FORMAT).to_string()
}

/// `1h 02m 05s`, dropping leading zero units.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let (h, m, s) = (seconds / 3600, seconds % 3600 / 60, seconds % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}
