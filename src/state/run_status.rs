/// Run status definitions for tracking crawl lifecycle
use serde::Serialize;
use std::fmt;

/// Represents the current state of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Run is registered but its task has not started yet
    Pending,

    /// Dispatch loop is active
    Running,

    /// Frontier drained (or the run was stopped) and all tasks finished
    Completed,

    /// Run could not start, e.g. invalid start URL or HTTP client build failure
    Failed,
}

impl RunStatus {
    /// Returns true if the run will not change status again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
