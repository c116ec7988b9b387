use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use trainer_core::Clock;

/// Name given to users who do not enter one.
pub const DEFAULT_USER: &str = "Guest";

/// Who is training in this process and since when.
///
/// Passed explicitly to every service call that acts on behalf of the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    user: String,
    session_id: Uuid,
    started_at: NaiveDateTime,
}

impl SessionContext {
    /// Start a session for `user`. Blank names fall back to `fallback`.
    #[must_use]
    pub fn start(user: &str, fallback: &str, clock: Clock) -> Self {
        let trimmed = user.trim();
        let user = if trimmed.is_empty() { fallback } else { trimmed };
        Self {
            user: user.to_owned(),
            session_id: Uuid::new_v4(),
            started_at: clock.now(),
        }
    }

    /// Context for the time before anyone signs in. Its user name is empty,
    /// which no sign-in can produce.
    #[must_use]
    pub fn anonymous(clock: Clock) -> Self {
        Self {
            user: String::new(),
            session_id: Uuid::new_v4(),
            started_at: clock.now(),
        }
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.user.is_empty()
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    #[must_use]
    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    /// Whole seconds between the session start and `now`, never negative.
    #[must_use]
    pub fn elapsed_secs(&self, now: NaiveDateTime) -> u64 {
        u64::try_from((now - self.started_at).num_seconds()).unwrap_or(0)
    }
}
