use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-record synchronization state. Transitions one way, from `PendingSync`
/// to `Synced`; only a new local mutation marks a record pending again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    PendingSync,
    Synced,
}

/// Records deserialized from the remote store carry no sync column; absence
/// means remotely confirmed.
impl Default for SyncStatus {
    fn default() -> Self {
        SyncStatus::Synced
    }
}

impl SyncStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SyncStatus::PendingSync => "PENDING_SYNC",
            SyncStatus::Synced => "SYNCED",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SyncStatus::PendingSync)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
