use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Visit identifier. Assigned locally at creation and carried unchanged
/// through the remote insert, so callers never observe an id change when a
/// queued visit is promoted to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisitId(String);

impl VisitId {
    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("Visit ID cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<VisitId> for String {
    fn from(value: VisitId) -> Self {
        value.0
    }
}
