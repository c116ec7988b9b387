//! Fixed-width text progress bars.

pub const BAR_WIDTH: usize = 40;
pub const FILLED: char = '◆';
pub const EMPTY: char = '◇';

/// Colour tier for a percentage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    High,
    Medium,
    Low,
}

impl Tone {
    #[must_use]
    pub fn of(percent: f64) -> Self {
        if percent >= 90.0 {
            Tone::High
        } else if percent >= 50.0 {
            Tone::Medium
        } else {
            Tone::Low
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProgressBarVm {
    pub filled: usize,
    pub empty: usize,
    pub percent: f64,
    pub tone: Tone,
}

impl ProgressBarVm {
    /// The bar glyphs without colour or label.
    #[must_use]
    pub fn glyphs(&self) -> String {
        let mut out = String::with_capacity((self.filled + self.empty) * FILLED.len_utf8());
        out.extend(std::iter::repeat_n(FILLED, self.filled));
        out.extend(std::iter::repeat_n(EMPTY, self.empty));
        out
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!("{:.1}%", self.percent)
    }
}

/// Map a percentage to a bar of `width` cells. Out-of-range input is clamped.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn map_progress_bar(percent: f64, width: usize) -> ProgressBarVm {
    let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
    let filled = ((width as f64 * percent / 100.0).floor() as usize).min(width);
    ProgressBarVm {
        filled,
        empty: width - filled,
        percent,
        tone: Tone::of(percent),
    }
}
