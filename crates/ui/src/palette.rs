use std::fmt::Display;

use owo_colors::{OwoColorize, Style};

use crate::vm::{ProgressBarVm, Tone};

/// Terminal colours, or none at all when output is not a terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub const PLAIN: Self = Self { enabled: false };
    pub const COLORED: Self = Self { enabled: true };

    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    #[must_use]
    pub fn is_enabled(self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn paint(self, text: impl Display, style: Style) -> String {
        if self.enabled {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub fn heading(self, text: impl Display) -> String {
        self.paint(text, Style::new().cyan().bold())
    }

    #[must_use]
    pub fn success(self, text: impl Display) -> String {
        self.paint(text, Style::new().green().bold())
    }

    #[must_use]
    pub fn warning(self, text: impl Display) -> String {
        self.paint(text, Style::new().yellow())
    }

    #[must_use]
    pub fn error(self, text: impl Display) -> String {
        self.paint(text, Style::new().red().bold())
    }

    #[must_use]
    pub fn accent(self, text: impl Display) -> String {
        self.paint(text, Style::new().magenta())
    }

    #[must_use]
    pub fn muted(self, text: impl Display) -> String {
        self.paint(text, Style::new().dimmed())
    }

    #[must_use]
    pub fn tone(self, text: impl Display, tone: Tone) -> String {
        let style = match tone {
            Tone::High => Style::new().green(),
            Tone::Medium => Style::new().cyan(),
            Tone::Low => Style::new().magenta(),
        };
        self.paint(text, style)
    }

    /// `[◆◆◇◇] 50.0%` with the glyphs coloured by tier.
    #[must_use]
    pub fn bar(self, bar: &ProgressBarVm) -> String {
        format!("[{}] {}", self.tone(bar.glyphs(), bar.tone), bar.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::map_progress_bar;

    #[test]
    fn plain_palette_adds_no_escapes() {
        let p = Palette::PLAIN;
        assert_eq!(p.heading("Menu"), "Menu");
        assert_eq!(p.bar(&map_progress_bar(50.0, 4)), "[◆◆◇◇] 50.0%");
    }

    #[test]
    fn colored_palette_wraps_text() {
        let painted = Palette::COLORED.success("ok");
        assert!(painted.contains("ok"));
        assert!(painted.starts_with('\u{1b}'));
    }
}
