pub mod data_service;
pub mod device_identity;
pub mod heartbeat;
pub mod provisioning;

pub use data_service::{DataService, NewVisitRequest, SyncSummary};
pub use device_identity::{DeviceIdentity, DeviceIdentityService};
pub use heartbeat::HeartbeatService;
pub use provisioning::{ProvisioningService, ProvisioningState};
