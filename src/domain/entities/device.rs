use crate::domain::value_objects::{DeviceId, DeviceStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persistent binding between a physical kiosk and exactly one condominium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub identifier: DeviceId,
    pub condominium_id: i64,
    pub label: String,
    pub status: DeviceStatus,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl Device {
    pub fn new(identifier: DeviceId, condominium_id: i64, label: String) -> Self {
        Self {
            identifier,
            condominium_id,
            label,
            status: DeviceStatus::Active,
            last_seen_at: Some(Utc::now()),
        }
    }
}

/// The subset of the remote device row the provisioning check needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceBinding {
    pub condominium_id: i64,
    pub condominium_name: String,
    pub status: DeviceStatus,
}

/// Provisional binding entered through the offline manual form, persisted
/// locally until it reconciles with the remote device table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineBinding {
    pub condominium_id: i64,
    pub condominium_name: String,
    pub bound_at: DateTime<Utc>,
    /// False until the device row has been upserted remotely.
    #[serde(default)]
    pub reconciled: bool,
}
