use crate::domain::entities::{
    AuditEntry, Condominium, Device, DeviceBinding, Incident, NewVisit, ServiceType, Staff,
    UnitWithResidents, Visit, VisitType, VisitUpdate,
};
use crate::domain::value_objects::{DeviceId, IncidentStatus, VisitId, VisitStatus};
use crate::shared::error::GatewayError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Every remote call funnels through here, one method per operation.
///
/// Reads log transport errors and return neutral values. The visit write
/// path returns a typed [`GatewayError`] so the sync pass can branch on
/// `Conflict` vs `Rejected` vs `Connectivity`. No retries in
/// implementations; that policy belongs to the DataService.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn get_condominium(&self, id: i64) -> Option<Condominium>;

    /// PIN comparison happens server-side. `Ok(None)` means rejected
    /// credentials, `Err` means the check could not be performed.
    async fn verify_staff_login(
        &self,
        first_name: &str,
        last_name: &str,
        pin: &str,
    ) -> Result<Option<Staff>, GatewayError>;

    async fn get_visit_types(&self) -> Vec<VisitType>;
    async fn get_service_types(&self) -> Vec<ServiceType>;
    async fn get_units_with_residents(&self, condominium_id: i64) -> Vec<UnitWithResidents>;

    async fn get_todays_visits(&self, condominium_id: i64) -> Vec<Visit>;
    /// The insert carries the locally-generated id; the returned record
    /// keeps it.
    async fn create_visit(&self, visit: &NewVisit) -> Result<Visit, GatewayError>;
    async fn update_visit(&self, id: &VisitId, update: &VisitUpdate) -> bool;
    async fn update_visit_status(
        &self,
        id: &VisitId,
        status: VisitStatus,
        checked_out_at: Option<DateTime<Utc>>,
    ) -> bool;

    async fn get_incidents(&self, condominium_id: i64) -> Vec<Incident>;
    async fn acknowledge_incident(&self, id: i64, staff_id: i64) -> bool;
    /// Appends a timestamped note to the existing notes, never overwriting
    /// prior entries.
    async fn report_incident_action(&self, id: i64, notes: &str, status: IncidentStatus) -> bool;

    /// Upsert keyed by device identifier.
    async fn register_device(&self, device: &Device) -> bool;
    async fn update_device_heartbeat(&self, identifier: &DeviceId);
    async fn get_device_by_identifier(&self, identifier: &DeviceId) -> Option<DeviceBinding>;
    async fn get_active_devices(
        &self,
        condominium_id: i64,
        exclude_identifier: Option<DeviceId>,
    ) -> Vec<Device>;

    /// Accepts a base64 data URL, returns the public URL of the stored object.
    async fn upload_photo(&self, data_url: &str, path_hint: &str) -> Option<String>;

    /// Best-effort; failures are logged and swallowed.
    async fn log_audit(&self, entry: &AuditEntry);
}
