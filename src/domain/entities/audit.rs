use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Best-effort audit trail entry. Emission is fire-and-forget: a failed write
/// is logged and swallowed, never affecting the primary operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub condominium_id: i64,
    pub actor: String,
    pub action: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(condominium_id: i64, actor: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            condominium_id,
            actor: actor.into(),
            action: action.into(),
            detail: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
