use crate::application::ports::remote_gateway::RemoteGateway;
use crate::domain::entities::{
    AuditEntry, Condominium, Device, DeviceBinding, Incident, NewVisit, ServiceType, Staff,
    UnitWithResidents, Visit, VisitType, VisitUpdate,
};
use crate::domain::value_objects::{DeviceId, IncidentStatus, VisitId, VisitStatus};
use crate::shared::error::GatewayError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Gateway for the no-backend mode: every operation yields its neutral value
/// without touching the network. Paired with [`super::OfflineProbe`] so the
/// DataService never reports online in this mode.
pub struct OfflineGateway;

#[async_trait]
impl RemoteGateway for OfflineGateway {
    async fn get_condominium(&self, _id: i64) -> Option<Condominium> {
        None
    }

    async fn verify_staff_login(
        &self,
        _first_name: &str,
        _last_name: &str,
        _pin: &str,
    ) -> Result<Option<Staff>, GatewayError> {
        Err(GatewayError::Connectivity("no remote backend configured".into()))
    }

    async fn get_visit_types(&self) -> Vec<VisitType> {
        Vec::new()
    }

    async fn get_service_types(&self) -> Vec<ServiceType> {
        Vec::new()
    }

    async fn get_units_with_residents(&self, _condominium_id: i64) -> Vec<UnitWithResidents> {
        Vec::new()
    }

    async fn get_todays_visits(&self, _condominium_id: i64) -> Vec<Visit> {
        Vec::new()
    }

    async fn create_visit(&self, _visit: &NewVisit) -> Result<Visit, GatewayError> {
        Err(GatewayError::Connectivity("no remote backend configured".into()))
    }

    async fn update_visit(&self, _id: &VisitId, _update: &VisitUpdate) -> bool {
        false
    }

    async fn update_visit_status(
        &self,
        _id: &VisitId,
        _status: VisitStatus,
        _checked_out_at: Option<DateTime<Utc>>,
    ) -> bool {
        false
    }

    async fn get_incidents(&self, _condominium_id: i64) -> Vec<Incident> {
        Vec::new()
    }

    async fn acknowledge_incident(&self, _id: i64, _staff_id: i64) -> bool {
        false
    }

    async fn report_incident_action(
        &self,
        _id: i64,
        _notes: &str,
        _status: IncidentStatus,
    ) -> bool {
        false
    }

    async fn register_device(&self, _device: &Device) -> bool {
        false
    }

    async fn update_device_heartbeat(&self, _identifier: &DeviceId) {}

    async fn get_device_by_identifier(&self, _identifier: &DeviceId) -> Option<DeviceBinding> {
        None
    }

    async fn get_active_devices(
        &self,
        _condominium_id: i64,
        _exclude_identifier: Option<DeviceId>,
    ) -> Vec<Device> {
        Vec::new()
    }

    async fn upload_photo(&self, _data_url: &str, _path_hint: &str) -> Option<String> {
        None
    }

    async fn log_audit(&self, _entry: &AuditEntry) {}
}
