pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::services::{
    DataService, DeviceIdentity, DeviceIdentityService, HeartbeatService, NewVisitRequest,
    ProvisioningService, ProvisioningState, SyncSummary,
};
pub use shared::config::AppConfig;
pub use shared::error::{AppError, GatewayError};
pub use state::AppState;

/// Installs the tracing subscriber. Call once from the host shell.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatehouse=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
