use crate::application::ports::connectivity::ConnectivityProbe;
use crate::application::ports::local_store::LocalStore;
use crate::application::ports::remote_gateway::RemoteGateway;
use crate::application::services::{
    DataService, DeviceIdentityService, HeartbeatService, ProvisioningService,
};
use crate::infrastructure::database::{ConnectionPool, SqliteLocalStore};
use crate::infrastructure::remote::{
    HttpConnectivityProbe, HttpGateway, OfflineGateway, OfflineProbe,
};
use crate::shared::config::AppConfig;
use std::sync::Arc;
use tracing::info;

/// Everything the kiosk shell needs, constructed once at startup and passed
/// by handle. Services are explicit dependencies, never ambient globals; the
/// single DataService instance is what keeps the queue single-writer.
#[derive(Clone)]
pub struct AppState {
    pub data: Arc<DataService>,
    pub provisioning: Arc<ProvisioningService>,
    pub device_identity: Arc<DeviceIdentityService>,
    pub heartbeat: Arc<HeartbeatService>,
    pub db: ConnectionPool,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.storage.data_dir)?;

        let db = ConnectionPool::new(&config.database.url, config.database.max_connections).await?;
        db.migrate().await?;
        let store: Arc<dyn LocalStore> = Arc::new(SqliteLocalStore::new(db.clone()));

        let has_remote = config.remote.is_some();
        let (gateway, probe): (Arc<dyn RemoteGateway>, Arc<dyn ConnectivityProbe>) =
            match &config.remote {
                Some(remote) => (
                    Arc::new(HttpGateway::new(remote)?),
                    Arc::new(HttpConnectivityProbe::new(remote)?),
                ),
                None => {
                    info!("no remote backend configured, running local-only");
                    (Arc::new(OfflineGateway), Arc::new(OfflineProbe))
                }
            };

        let data = Arc::new(DataService::new(
            store.clone(),
            gateway.clone(),
            probe.clone(),
            has_remote,
        ));
        let device_identity = Arc::new(DeviceIdentityService::new(store.clone()));
        let provisioning = Arc::new(ProvisioningService::new(
            device_identity.clone(),
            store,
            gateway.clone(),
            probe.clone(),
            "Entrance kiosk".to_string(),
        ));
        let heartbeat = Arc::new(HeartbeatService::new(
            gateway,
            probe,
            data.clone(),
            config.sync.clone(),
        ));

        Ok(Self {
            data,
            provisioning,
            device_identity,
            heartbeat,
            db,
        })
    }

    /// Starts the heartbeat loop once the device identity is known.
    pub async fn start_background_tasks(&self) -> anyhow::Result<()> {
        let identity = self.device_identity.resolve().await?;
        self.heartbeat.clone().schedule(identity.id);
        Ok(())
    }
}
