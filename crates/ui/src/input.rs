//! Typed input events. Raw strings stop here; services only see these.

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "выход"];

fn is_exit(raw: &str) -> bool {
    raw == "0" || EXIT_WORDS.iter().any(|w| raw.to_lowercase() == *w)
}

/// A pick from a keyed menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuInput {
    Back,
    Select(String),
}

impl MenuInput {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if is_exit(raw) {
            MenuInput::Back
        } else {
            MenuInput::Select(raw.to_owned())
        }
    }
}

/// A numbered answer to a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceInput {
    Quit,
    /// 1-based option number; range is checked by the test session.
    Choice(usize),
    Invalid,
}

impl ChoiceInput {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if is_exit(raw) {
            return ChoiceInput::Quit;
        }
        raw.parse().map_or(ChoiceInput::Invalid, ChoiceInput::Choice)
    }
}

/// What the user typed at a scenario step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepInput {
    Help,
    Skip,
    Answer(String),
}

impl StepInput {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "help" => StepInput::Help,
            "skip" => StepInput::Skip,
            _ => StepInput::Answer(raw.to_owned()),
        }
    }
}
