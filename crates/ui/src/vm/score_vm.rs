use trainer_core::stats::ScoreBand;

use crate::vm::Tone;

#[must_use]
pub fn band_label(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Excellent => "Excellent result!",
        ScoreBand::Good => "Good result. Keep it up!",
        ScoreBand::NeedsPractice => "Keep practicing and try again.",
    }
}

#[must_use]
pub fn band_tone(band: ScoreBand) -> Tone {
    match band {
        ScoreBand::Excellent => Tone::High,
        ScoreBand::Good => Tone::Medium,
        ScoreBand::NeedsPractice => Tone::Low,
    }
}

/// Display title of a test level.
#[must_use]
pub fn level_title(level: &str, name: Option<&str>) -> String {
    name.map_or_else(|| format!("Level {level}"), str::to_owned)
}
