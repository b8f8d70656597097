use crate::application::ports::connectivity::ConnectivityProbe;
use crate::application::ports::remote_gateway::RemoteGateway;
use crate::application::services::data_service::DataService;
use crate::domain::value_objects::DeviceId;
use crate::shared::config::SyncConfig;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Fixed-interval heartbeat and online poll.
///
/// Each tick probes connectivity, emits the device heartbeat when online
/// (best-effort) and, on an offline-to-online transition, triggers one sync
/// pass. Ticks are idempotent and the sync pass carries its own in-flight
/// guard, so overlapping ticks cannot double-fire.
pub struct HeartbeatService {
    gateway: Arc<dyn RemoteGateway>,
    probe: Arc<dyn ConnectivityProbe>,
    data: Arc<DataService>,
    config: SyncConfig,
    online: Arc<AtomicBool>,
}

impl HeartbeatService {
    pub fn new(
        gateway: Arc<dyn RemoteGateway>,
        probe: Arc<dyn ConnectivityProbe>,
        data: Arc<DataService>,
        config: SyncConfig,
    ) -> Self {
        Self {
            gateway,
            probe,
            data,
            config,
            online: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Last observed connectivity, for the passive online/offline indicator.
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    /// Runs one tick: probe, heartbeat, reconnect-sync. Extracted so tests
    /// can drive ticks without the timer.
    pub async fn tick(&self, device_id: &DeviceId) {
        let now_online = self.probe.is_online().await;
        let was_online = self.online.swap(now_online, Ordering::Relaxed);

        if !now_online {
            return;
        }

        self.gateway.update_device_heartbeat(device_id).await;

        if !was_online && self.config.sync_on_reconnect {
            match self.data.sync_pending_visits().await {
                Ok(summary) if summary.synced > 0 => {
                    tracing::info!("reconnect sync pushed {} queued visits", summary.synced);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("reconnect sync failed: {}", e),
            }
        }
    }

    /// Poll period with jitter, clamped to at least one second regardless of
    /// where the config came from (a zero period panics the tokio interval).
    fn period(&self) -> tokio::time::Duration {
        let jitter = if self.config.heartbeat_jitter > 0 {
            rand::thread_rng().gen_range(0..=self.config.heartbeat_jitter)
        } else {
            0
        };
        tokio::time::Duration::from_secs((self.config.heartbeat_interval + jitter).max(1))
    }

    /// Spawns the polling loop. A small random jitter is added to the
    /// interval so a fleet of kiosks does not heartbeat in lockstep after a
    /// shared outage.
    pub fn schedule(self: Arc<Self>, device_id: DeviceId) {
        let period = self.period();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                self.tick(&device_id).await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::local_store::LocalStore;
    use crate::domain::entities::{
        ApprovalMode, AuditEntry, Condominium, Device, DeviceBinding, Incident, NewVisit,
        ServiceType, Staff, UnitWithResidents, Visit, VisitType, VisitUpdate,
    };
    use crate::domain::value_objects::{IncidentStatus, SyncStatus, VisitId, VisitStatus};
    use crate::infrastructure::database::{ConnectionPool, SqliteLocalStore};
    use crate::infrastructure::remote::OfflineProbe;
    use crate::shared::error::GatewayError;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use mockall::mock;

    mock! {
        pub Gateway {}

        #[async_trait]
        impl RemoteGateway for Gateway {
            async fn get_condominium(&self, id: i64) -> Option<Condominium>;
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
            async fn report_incident_action(&self, id: i64, notes: &str, status: IncidentStatus) -> bool;
            async fn register_device(&self, device: &Device) -> bool;
            async fn update_device_heartbeat(&self, identifier: &DeviceId);
            async fn get_device_by_identifier(&self, identifier: &DeviceId) -> Option<DeviceBinding>;
            async fn get_active_devices(
                &self,
                condominium_id: i64,
                exclude_identifier: Option<DeviceId>,
            ) -> Vec<Device>;
            async fn upload_photo(&self, data_url: &str, path_hint: &str) -> Option<String>;
            async fn log_audit(&self, entry: &AuditEntry);
        }
    }

    mock! {
        pub Probe {}

        #[async_trait]
        impl ConnectivityProbe for Probe {
            async fn is_online(&self) -> bool;
        }
    }

    fn sync_config() -> SyncConfig {
        SyncConfig {
            heartbeat_interval: 60,
            heartbeat_jitter: 0,
            sync_on_reconnect: true,
        }
    }

    async fn queue_one_pending(store: &Arc<SqliteLocalStore>) {
        let visit = Visit {
            id: VisitId::generate(),
            condominium_id: 7,
            visitor_name: "Queued".to_string(),
            visitor_document: None,
            visitor_phone: None,
            visit_type_id: 1,
            service_type_id: None,
            unit_id: None,
            status: VisitStatus::Pending,
            approval_mode: ApprovalMode::Guard,
            checked_in_at: None,
            checked_out_at: None,
            photo_url: None,
            pending_photo: None,
            qr_token: None,
            guard_id: None,
            sync_status: SyncStatus::PendingSync,
            created_at: Utc::now(),
            type_name: None,
            unit_label: None,
        };
        store.save_visits(&[visit]).await.unwrap();
    }

    #[tokio::test]
    async fn zero_interval_is_clamped_to_one_second() {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        let store = Arc::new(SqliteLocalStore::new(pool));

        let gateway: Arc<dyn RemoteGateway> = Arc::new(MockGateway::new());
        let probe: Arc<dyn ConnectivityProbe> = Arc::new(OfflineProbe);
        let data = Arc::new(DataService::new(store, gateway.clone(), probe.clone(), true));
        let config = SyncConfig {
            heartbeat_interval: 0,
            heartbeat_jitter: 0,
            sync_on_reconnect: true,
        };
        let heartbeat = HeartbeatService::new(gateway, probe, data, config);

        assert!(heartbeat.period() >= tokio::time::Duration::from_secs(1));
    }

    #[tokio::test]
    async fn offline_tick_emits_nothing() {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        let store = Arc::new(SqliteLocalStore::new(pool));

        // Gateway without expectations: any call panics.
        let gateway: Arc<dyn RemoteGateway> = Arc::new(MockGateway::new());
        let mut probe = MockProbe::new();
        probe.expect_is_online().returning(|| false);
        let probe: Arc<dyn ConnectivityProbe> = Arc::new(probe);
        let data = Arc::new(DataService::new(
            store,
            gateway.clone(),
            probe.clone(),
            true,
        ));
        let heartbeat = HeartbeatService::new(gateway, probe, data, sync_config());

        heartbeat.tick(&DeviceId::generate()).await;
        assert!(!heartbeat.is_online());
    }

    #[tokio::test]
    async fn reconnect_tick_heartbeats_and_syncs_queue() {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        let store = Arc::new(SqliteLocalStore::new(pool));
        queue_one_pending(&store).await;

        let mut gateway = MockGateway::new();
        gateway
            .expect_update_device_heartbeat()
            .times(2)
            .returning(|_| ());
        gateway.expect_create_visit().times(1).returning(|new| {
            let mut visit = Visit {
                id: new.id.clone(),
                condominium_id: new.condominium_id,
                visitor_name: new.visitor_name.clone(),
                visitor_document: None,
                visitor_phone: None,
                visit_type_id: new.visit_type_id,
                service_type_id: None,
                unit_id: None,
                status: new.status,
                approval_mode: new.approval_mode,
                checked_in_at: None,
                checked_out_at: None,
                photo_url: None,
                pending_photo: None,
                qr_token: None,
                guard_id: None,
                sync_status: SyncStatus::PendingSync,
                created_at: new.created_at,
                type_name: None,
                unit_label: None,
            };
            visit.mark_synced();
            Ok(visit)
        });
        let gateway: Arc<dyn RemoteGateway> = Arc::new(gateway);

        let mut probe = MockProbe::new();
        probe.expect_is_online().returning(|| true);
        let probe: Arc<dyn ConnectivityProbe> = Arc::new(probe);

        let data = Arc::new(DataService::new(
            store.clone(),
            gateway.clone(),
            probe.clone(),
            true,
        ));
        let heartbeat = HeartbeatService::new(gateway, probe, data, sync_config());
        let device_id = DeviceId::generate();

        // First tick is the offline->online transition: heartbeat + sync.
        heartbeat.tick(&device_id).await;
        assert!(heartbeat.is_online());
        let pending = store
            .load_visits()
            .await
            .unwrap()
            .into_iter()
            .filter(|v| v.sync_status.is_pending())
            .count();
        assert_eq!(pending, 0);

        // Second tick stays online: heartbeat only, no second sync push.
        heartbeat.tick(&device_id).await;
    }
}
