use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitStatus {
    Pending,
    Approved,
    Denied,
    Inside,
    Left,
}

impl VisitStatus {
    pub fn as_str(&self) -> &str {
        match self {
            VisitStatus::Pending => "PENDING",
            VisitStatus::Approved => "APPROVED",
            VisitStatus::Denied => "DENIED",
            VisitStatus::Inside => "INSIDE",
            VisitStatus::Left => "LEFT",
        }
    }

    /// LEFT is the only terminal state; a visit there takes no further
    /// transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, VisitStatus::Left)
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
