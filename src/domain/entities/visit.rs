use crate::domain::value_objects::{SyncStatus, VisitId, VisitStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    Resident,
    Guard,
    QrCode,
    FreeEntry,
}

/// Read/display model of a single access event, as shown to the guard.
/// Joined display fields (`type_name`, `unit_label`) come from the remote
/// fetch and are never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: VisitId,
    pub condominium_id: i64,
    pub visitor_name: String,
    pub visitor_document: Option<String>,
    pub visitor_phone: Option<String>,
    pub visit_type_id: i64,
    pub service_type_id: Option<i64>,
    /// Destination unit; free-entry categories have none.
    pub unit_id: Option<i64>,
    pub status: VisitStatus,
    pub approval_mode: ApprovalMode,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub photo_url: Option<String>,
    /// Data URL of a photo captured while offline, held until the sync pass
    /// uploads it and fills `photo_url`.
    #[serde(default)]
    pub pending_photo: Option<String>,
    pub qr_token: Option<String>,
    pub guard_id: Option<i64>,
    #[serde(default)]
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub unit_label: Option<String>,
}

impl Visit {
    pub fn mark_synced(&mut self) {
        self.sync_status = SyncStatus::Synced;
    }

    /// Applies a status transition locally. Entering INSIDE stamps check-in,
    /// entering LEFT stamps check-out; either way the record goes back to
    /// `PENDING_SYNC` until the remote store confirms it. LEFT is terminal:
    /// a visit there takes no further transitions.
    pub fn transition(&mut self, status: VisitStatus, now: DateTime<Utc>) {
        if self.status.is_terminal() {
            return;
        }
        match status {
            VisitStatus::Inside if self.checked_in_at.is_none() => {
                self.checked_in_at = Some(now);
            }
            VisitStatus::Left => {
                self.checked_out_at = Some(now);
            }
            _ => {}
        }
        self.status = status;
        self.sync_status = SyncStatus::PendingSync;
    }
}

/// Write model for the remote insert: exactly the fields the remote store
/// accepts, no display-only columns. Produced by [`NewVisit::from_visit`], so
/// no runtime field-stripping happens anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVisit {
    pub id: VisitId,
    pub condominium_id: i64,
    pub visitor_name: String,
    pub visitor_document: Option<String>,
    pub visitor_phone: Option<String>,
    pub visit_type_id: i64,
    pub service_type_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub status: VisitStatus,
    pub approval_mode: ApprovalMode,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub photo_url: Option<String>,
    pub qr_token: Option<String>,
    pub guard_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl NewVisit {
    pub fn from_visit(visit: &Visit) -> Self {
        Self {
            id: visit.id.clone(),
            condominium_id: visit.condominium_id,
            visitor_name: visit.visitor_name.clone(),
            visitor_document: visit.visitor_document.clone(),
            visitor_phone: visit.visitor_phone.clone(),
            visit_type_id: visit.visit_type_id,
            service_type_id: visit.service_type_id,
            unit_id: visit.unit_id,
            status: visit.status,
            approval_mode: visit.approval_mode,
            checked_in_at: visit.checked_in_at,
            checked_out_at: visit.checked_out_at,
            photo_url: visit.photo_url.clone(),
            qr_token: visit.qr_token.clone(),
            guard_id: visit.guard_id,
            created_at: visit.created_at,
        }
    }
}

/// Partial update pushed for an already-created visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisitUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VisitStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_in_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_out_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}
