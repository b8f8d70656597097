use crate::domain::value_objects::IncidentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resident-reported event. Notes are append-only: every guard action
/// appends a timestamped entry, prior text is never overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: i64,
    pub condominium_id: i64,
    pub resident_id: i64,
    pub unit_id: i64,
    pub incident_type: String,
    pub description: String,
    pub photo_url: Option<String>,
    pub status: IncidentStatus,
    pub notes: Option<String>,
    pub acknowledged_by: Option<i64>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resident_name: Option<String>,
    #[serde(default)]
    pub unit_label: Option<String>,
}

/// Builds the new notes value for an incident action: the fresh entry gets a
/// timestamp header and is appended after any existing notes, oldest first.
pub fn append_incident_note(
    existing: Option<&str>,
    note: &str,
    at: DateTime<Utc>,
) -> String {
    let entry = format!("[{}] {}", at.format("%Y-%m-%d %H:%M:%S UTC"), note.trim());
    match existing {
        Some(prior) if !prior.trim().is_empty() => format!("{prior}\n{entry}"),
        _ => entry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn first_note_has_no_trailing_separator() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let notes = append_incident_note(None, "gate checked", at);
        assert_eq!(notes, "[2026-03-01 10:00:00 UTC] gate checked");
    }

    #[test]
    fn second_note_keeps_both_entries_in_order() {
        let first_at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let second_at = Utc.with_ymd_and_hms(2026, 3, 1, 11, 30, 0).unwrap();
        let notes = append_incident_note(None, "gate checked", first_at);
        let notes = append_incident_note(Some(&notes), "locksmith called", second_at);
        assert_eq!(
            notes,
            "[2026-03-01 10:00:00 UTC] gate checked\n[2026-03-01 11:30:00 UTC] locksmith called"
        );
    }

    #[test]
    fn blank_existing_notes_are_treated_as_absent() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let notes = append_incident_note(Some("   "), "noted", at);
        assert_eq!(notes, "[2026-03-01 10:00:00 UTC] noted");
    }
}
