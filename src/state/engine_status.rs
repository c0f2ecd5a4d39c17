/// Engine status definitions for tracking a site crawl's lifecycle
///
/// An engine starts `Idle`, becomes `Running` on its first iteration, and
/// ends in exactly one terminal status.
use std::fmt;

/// Represents the lifecycle status of one site's crawl engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineStatus {
    // ===== Active States =====
    /// Engine has been built but has not fetched anything yet
    Idle,

    /// Engine is fetching and expanding the frontier
    Running,

    // ===== Terminal States =====
    /// The article target was reached
    Completed,

    /// The frontier emptied before the article target was reached
    Starved,

    /// A snapshot could not be persisted; the crawl stopped
    Failed,
}

impl EngineStatus {
    /// Returns true if the engine has stopped for good
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Starved | Self::Failed)
    }

    /// Returns true if this terminal status is not an error
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::Starved)
    }

    /// Checks whether moving from this status to `to` is allowed
    pub fn can_transition_to(&self, to: EngineStatus) -> bool {
        matches!(
            (self, to),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::Failed)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Starved)
                | (Self::Running, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Starved => "starved",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!EngineStatus::Idle.is_terminal());
        assert!(!EngineStatus::Running.is_terminal());
        assert!(EngineStatus::Completed.is_terminal());
        assert!(EngineStatus::Starved.is_terminal());
        assert!(EngineStatus::Failed.is_terminal());
    }

    #[test]
    fn test_starved_is_not_an_error() {
        assert!(EngineStatus::Starved.is_success());
        assert!(EngineStatus::Completed.is_success());
        assert!(!EngineStatus::Failed.is_success());
    }

    #[test]
    fn test_valid_transitions() {
        assert!(EngineStatus::Idle.can_transition_to(EngineStatus::Running));
        assert!(EngineStatus::Idle.can_transition_to(EngineStatus::Failed));
        assert!(EngineStatus::Running.can_transition_to(EngineStatus::Completed));
        assert!(EngineStatus::Running.can_transition_to(EngineStatus::Starved));
        assert!(EngineStatus::Running.can_transition_to(EngineStatus::Failed));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!EngineStatus::Idle.can_transition_to(EngineStatus::Completed));
        assert!(!EngineStatus::Completed.can_transition_to(EngineStatus::Running));
        assert!(!EngineStatus::Starved.can_transition_to(EngineStatus::Failed));
        assert!(!EngineStatus::Running.can_transition_to(EngineStatus::Idle));
    }

    #[test]
    fn test_display() {
        assert_eq!(EngineStatus::Starved.to_string(), "starved");
    }
}
