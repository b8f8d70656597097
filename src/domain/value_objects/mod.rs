mod device_id;
mod device_status;
mod incident_status;
mod sync_status;
mod visit_id;
mod visit_status;

pub use device_id::DeviceId;
pub use device_status::DeviceStatus;
pub use incident_status::IncidentStatus;
pub use sync_status::SyncStatus;
pub use visit_id::VisitId;
pub use visit_status::VisitStatus;
