use std::fmt;

use crate::model::ErrorSimulation;

//
// ─── HINTS ─────────────────────────────────────────────────────────────────────
//

/// Generic nudges that apply regardless of which command was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// The answer was prefixed with `sudo`.
    NoSudoNeeded,
    /// The answer quotes something the solution does not.
    NoQuotesNeeded,
    /// `rm` without `-r` where a directory has to go.
    MissingRecursiveFlag,
}

impl Hint {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Hint::NoSudoNeeded => "Superuser privileges (sudo) are not required here.",
            Hint::NoQuotesNeeded => "This command does not need quotes.",
            Hint::MissingRecursiveFlag => "Removing directories needs the '-r' flag.",
        }
    }
}

//
// ─── VERDICT ───────────────────────────────────────────────────────────────────
//

/// Outcome of checking one free-text answer. Exactly one variant is correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    /// The answer matched a catalogued misconception.
    KnownMistake { wrong_input: String, message: String },
    Hint(Hint),
    /// Nothing more specific applies; the expected solution is revealed.
    Reveal { expected: String },
}

impl Verdict {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        matches!(self, Verdict::Correct)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Correct => f.write_str("Correct!"),
            Verdict::KnownMistake { message, .. } => write!(f, "Incorrect. {message}"),
            Verdict::Hint(hint) => write!(f, "Incorrect. Hint: {}", hint.message()),
            Verdict::Reveal { expected } => write!(f, "Incorrect. The correct answer is: {expected}"),
        }
    }
}

//
// ─── EVALUATION ────────────────────────────────────────────────────────────────
//

/// Lowercase, collapse whitespace runs to one space, trim.
///
/// ```
/// # use trainer_core::evaluator::normalize;
/// assert_eq!(normalize("  LS   -la \t"), "ls -la");
/// ```
#[must_use]
pub fn normalize(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_quote(s: &str) -> bool {
    s.contains(['"', '\''])
}

/// Check `answer` against `expected`, first match wins:
///
/// 1. normalized equality
/// 2. a catalogued wrong input (compared against the normalized answer)
/// 3. generic hints: `sudo`, needless quotes, `rm` without `-r`
/// 4. reveal the expected solution
///
/// Comparison is textual; no partial credit and no flag reordering.
#[must_use]
pub fn evaluate(answer: &str, expected: &str, simulations: &[ErrorSimulation]) -> Verdict {
    let given = normalize(answer);
    let wanted = normalize(expected);

    if given == wanted {
        return Verdict::Correct;
    }

    if let Some(sim) = simulations
        .iter()
        .find(|sim| given == sim.wrong_input.to_lowercase())
    {
        return Verdict::KnownMistake {
            wrong_input: sim.wrong_input.clone(),
            message: sim.message.clone(),
        };
    }

    if given.starts_with("sudo ") {
        return Verdict::Hint(Hint::NoSudoNeeded);
    }
    if has_quote(answer) && !has_quote(expected) {
        return Verdict::Hint(Hint::NoQuotesNeeded);
    }
    if wanted.starts_with("rm -r") && given.starts_with("rm ") && !given.starts_with("rm -r") {
        return Verdict::Hint(Hint::MissingRecursiveFlag);
    }

    Verdict::Reveal {
        expected: expected.to_owned(),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
