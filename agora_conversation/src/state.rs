use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a dialogue or debate session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Registered, no successful exchange yet.
    Created,
    Active,
    IdleExpired,
    Closed,
}

impl SessionState {
    /// Whether the session still accepts turns.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Created | Self::Active)
    }
}

/// True when `now - last_active_at` is strictly greater than `idle_timeout`.
#[must_use]
pub fn idle_for_longer_than(
    last_active_at: DateTime<Utc>,
    now: DateTime<Utc>,
    idle_timeout: Duration,
) -> bool {
    now.signed_duration_since(last_active_at) > idle_timeout
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_boundary_is_strict() {
        let now = Utc::now();
        let timeout = Duration::seconds(60);

        assert!(idle_for_longer_than(now - Duration::seconds(61), now, timeout));
        assert!(!idle_for_longer_than(now - Duration::seconds(60), now, timeout));
        assert!(!idle_for_longer_than(now - Duration::seconds(59), now, timeout));
    }

    #[test]
    fn only_created_and_active_are_live() {
        assert!(SessionState::Created.is_live());
        assert!(SessionState::Active.is_live());
        assert!(!SessionState::IdleExpired.is_live());
        assert!(!SessionState::Closed.is_live());
    }
}
