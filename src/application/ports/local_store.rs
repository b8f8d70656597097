use crate::domain::entities::{OfflineBinding, ServiceType, UnitWithResidents, Visit, VisitType};
use crate::domain::value_objects::DeviceId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable per-kiosk state: the visit queue plus keyed values (device
/// identifier, offline condominium binding, config caches).
///
/// `save_visits` replaces the whole collection in one transaction; no
/// partial write is ever visible. The
/// store does not interpret sync status; merge policy lives in the
/// DataService.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn load_visits(&self) -> Result<Vec<Visit>, AppError>;
    async fn save_visits(&self, visits: &[Visit]) -> Result<(), AppError>;

    async fn load_visit_types(&self) -> Result<Vec<VisitType>, AppError>;
    async fn save_visit_types(&self, types: &[VisitType]) -> Result<(), AppError>;
    async fn load_service_types(&self) -> Result<Vec<ServiceType>, AppError>;
    async fn save_service_types(&self, types: &[ServiceType]) -> Result<(), AppError>;
    async fn load_units(&self) -> Result<Vec<UnitWithResidents>, AppError>;
    async fn save_units(&self, units: &[UnitWithResidents]) -> Result<(), AppError>;

    async fn get_device_id(&self) -> Result<Option<DeviceId>, AppError>;
    async fn set_device_id(&self, id: &DeviceId) -> Result<(), AppError>;

    async fn get_offline_binding(&self) -> Result<Option<OfflineBinding>, AppError>;
    async fn set_offline_binding(&self, binding: &OfflineBinding) -> Result<(), AppError>;
}
