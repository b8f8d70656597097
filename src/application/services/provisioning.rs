use crate::application::ports::connectivity::ConnectivityProbe;
use crate::application::ports::local_store::LocalStore;
use crate::application::ports::remote_gateway::RemoteGateway;
use crate::application::services::device_identity::DeviceIdentityService;
use crate::domain::entities::{Device, OfflineBinding};
use crate::domain::value_objects::{DeviceId, DeviceStatus};
use crate::shared::error::AppError;
use chrono::Utc;
use std::sync::Arc;

/// Terminal outcome of the provisioning check that gates the whole
/// application. `Loading` is the check itself ([`ProvisioningService::resolve`]);
/// the manual form is entered from the offline prompt via
/// [`ProvisioningService::submit_manual_binding`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProvisioningState {
    Configured {
        device_id: DeviceId,
        condominium_id: i64,
        condominium_name: String,
        /// False when the device identity could not be persisted; the
        /// binding will not survive a reload.
        persisted: bool,
    },
    /// Not bound, connectivity present: the caller redirects to the online
    /// setup flow.
    UnconfiguredOnline { device_id: DeviceId },
    /// Not bound, no connectivity: the caller shows the identifier for
    /// out-of-band relay, with reload-retry and the manual-form escape.
    UnconfiguredOfflinePrompt { device_id: DeviceId },
}

/// Gates every route behind "is this device bound to a condominium".
/// Fail-closed: any gateway error during the check reads as not configured.
pub struct ProvisioningService {
    identity: Arc<DeviceIdentityService>,
    store: Arc<dyn LocalStore>,
    gateway: Arc<dyn RemoteGateway>,
    probe: Arc<dyn ConnectivityProbe>,
    device_label: String,
}

impl ProvisioningService {
    pub fn new(
        identity: Arc<DeviceIdentityService>,
        store: Arc<dyn LocalStore>,
        gateway: Arc<dyn RemoteGateway>,
        probe: Arc<dyn ConnectivityProbe>,
        device_label: String,
    ) -> Self {
        Self {
            identity,
            store,
            gateway,
            probe,
            device_label,
        }
    }

    /// The LOADING state: resolves the device identity and decides which
    /// branch renders. A connectivity-restored event re-enters here via a
    /// full reload, so every call starts from scratch.
    pub async fn resolve(&self) -> Result<ProvisioningState, AppError> {
        let identity = self.identity.resolve().await?;

        // A persisted local binding configures the kiosk with no remote
        // round trip; a provisional one is reconciled upstream when
        // connectivity allows.
        if let Some(binding) = self.store.get_offline_binding().await? {
            let binding = self.reconcile_if_possible(&identity.id, binding).await;
            return Ok(ProvisioningState::Configured {
                device_id: identity.id,
                condominium_id: binding.condominium_id,
                condominium_name: binding.condominium_name,
                persisted: identity.persisted,
            });
        }

        if !self.probe.is_online().await {
            return Ok(ProvisioningState::UnconfiguredOfflinePrompt {
                device_id: identity.id,
            });
        }

        match self.gateway.get_device_by_identifier(&identity.id).await {
            Some(binding) if binding.status == DeviceStatus::Active => {
                // Cache the confirmed binding so the next boot works offline.
                let cached = OfflineBinding {
                    condominium_id: binding.condominium_id,
                    condominium_name: binding.condominium_name.clone(),
                    bound_at: Utc::now(),
                    reconciled: true,
                };
                if let Err(e) = self.store.set_offline_binding(&cached).await {
                    tracing::warn!("could not cache device binding locally: {}", e);
                }
                self.gateway.update_device_heartbeat(&identity.id).await;
                Ok(ProvisioningState::Configured {
                    device_id: identity.id,
                    condominium_id: binding.condominium_id,
                    condominium_name: binding.condominium_name,
                    persisted: identity.persisted,
                })
            }
            // None covers "unknown device", every gateway error, and a
            // non-ACTIVE row alike: not configured.
            _ => Ok(ProvisioningState::UnconfiguredOnline {
                device_id: identity.id,
            }),
        }
    }

    /// Accepts the administrator-supplied condominium from the offline
    /// manual form and persists the provisional binding. The caller performs
    /// the full reload afterwards.
    pub async fn submit_manual_binding(
        &self,
        condominium_id: &str,
        condominium_name: &str,
    ) -> Result<(), AppError> {
        let id: i64 = condominium_id
            .trim()
            .parse()
            .map_err(|_| {
                AppError::Validation("Condominium id must be a positive number".into())
            })?;
        if id <= 0 {
            return Err(AppError::Validation(
                "Condominium id must be a positive number".into(),
            ));
        }
        let name = condominium_name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Condominium name is required".into()));
        }

        let binding = OfflineBinding {
            condominium_id: id,
            condominium_name: name.to_string(),
            bound_at: Utc::now(),
            reconciled: false,
        };
        self.store.set_offline_binding(&binding).await
    }

    /// A provisional (manually-entered) binding is pushed upstream the first
    /// time a resolve finds connectivity: the device row is upserted keyed by
    /// the identifier and the local binding is marked reconciled. The remote
    /// admin record, if it disagrees, wins on a later online resolve.
    async fn reconcile_if_possible(
        &self,
        device_id: &DeviceId,
        binding: OfflineBinding,
    ) -> OfflineBinding {
        if binding.reconciled || !self.probe.is_online().await {
            return binding;
        }

        let device = Device::new(
            device_id.clone(),
            binding.condominium_id,
            self.device_label.clone(),
        );
        if !self.gateway.register_device(&device).await {
            tracing::warn!(
                "provisional binding for condominium {} not yet reconciled",
                binding.condominium_id
            );
            return binding;
        }

        let mut reconciled = binding;
        reconciled.reconciled = true;
        if let Err(e) = self.store.set_offline_binding(&reconciled).await {
            tracing::warn!("could not persist reconciled binding: {}", e);
        }
        reconciled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        AuditEntry, Condominium, DeviceBinding, Incident, NewVisit, ServiceType, Staff,
        UnitWithResidents, Visit, VisitType, VisitUpdate,
    };
    use crate::domain::value_objects::{IncidentStatus, VisitId, VisitStatus};
    use crate::infrastructure::database::{ConnectionPool, SqliteLocalStore};
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

    async fn memory_store() -> Arc<SqliteLocalStore> {
        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        Arc::new(SqliteLocalStore::new(pool))
    }

    fn guard(
        store: Arc<SqliteLocalStore>,
        gateway: MockGateway,
        online: bool,
    ) -> ProvisioningService {
        let mut probe = MockProbe::new();
        probe.expect_is_online().returning(move || online);
        ProvisioningService::new(
            Arc::new(DeviceIdentityService::new(store.clone())),
            store,
            Arc::new(gateway),
            Arc::new(probe),
            "Front gate kiosk".to_string(),
        )
    }

    #[tokio::test]
    async fn unknown_device_online_goes_to_online_setup() {
        let store = memory_store().await;
        let mut gateway = MockGateway::new();
        gateway
            .expect_get_device_by_identifier()
            .returning(|_| None);
        let guard = guard(store, gateway, true);

        let state = guard.resolve().await.unwrap();
        assert!(matches!(state, ProvisioningState::UnconfiguredOnline { .. }));
    }

    #[tokio::test]
    async fn gateway_error_reads_as_not_configured() {
        // The gateway maps every remote failure to None, so an erroring
        // check must land on the unconfigured branch, never on Configured.
        let store = memory_store().await;
        let mut gateway = MockGateway::new();
        gateway
            .expect_get_device_by_identifier()
            .returning(|_| None);
        let guard = guard(store, gateway, true);

        let state = guard.resolve().await.unwrap();
        assert!(!matches!(state, ProvisioningState::Configured { .. }));
    }

    #[tokio::test]
    async fn decommissioned_device_is_not_configured() {
        let store = memory_store().await;
        let mut gateway = MockGateway::new();
        gateway.expect_get_device_by_identifier().returning(|_| {
            Some(DeviceBinding {
                condominium_id: 9,
                condominium_name: "Old Site".to_string(),
                status: DeviceStatus::Decommissioned,
            })
        });
        let guard = guard(store, gateway, true);

        let state = guard.resolve().await.unwrap();
        assert!(matches!(state, ProvisioningState::UnconfiguredOnline { .. }));
    }

    #[tokio::test]
    async fn active_remote_binding_configures_and_caches() {
        let store = memory_store().await;
        let mut gateway = MockGateway::new();
        gateway.expect_get_device_by_identifier().returning(|_| {
            Some(DeviceBinding {
                condominium_id: 42,
                condominium_name: "Acme Towers".to_string(),
                status: DeviceStatus::Active,
            })
        });
        gateway.expect_update_device_heartbeat().returning(|_| ());
        let guard = guard(store.clone(), gateway, true);

        let state = guard.resolve().await.unwrap();
        match state {
            ProvisioningState::Configured {
                condominium_id,
                condominium_name,
                ..
            } => {
                assert_eq!(condominium_id, 42);
                assert_eq!(condominium_name, "Acme Towers");
            }
            other => panic!("expected Configured, got {:?}", other),
        }

        let cached = store.get_offline_binding().await.unwrap().unwrap();
        assert_eq!(cached.condominium_id, 42);
        assert!(cached.reconciled);
    }

    #[tokio::test]
    async fn offline_unbound_device_shows_identifier_prompt() {
        let store = memory_store().await;
        let guard = guard(store.clone(), MockGateway::new(), false);

        let state = guard.resolve().await.unwrap();
        let ProvisioningState::UnconfiguredOfflinePrompt { device_id } = state else {
            panic!("expected offline prompt");
        };
        // The prompt shows the same identifier the store persists.
        let stored = store.get_device_id().await.unwrap().unwrap();
        assert_eq!(device_id, stored);
    }

    #[tokio::test]
    async fn manual_binding_validates_both_fields() {
        let store = memory_store().await;
        let guard = guard(store, MockGateway::new(), false);

        assert!(matches!(
            guard.submit_manual_binding("", "Acme Towers").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            guard.submit_manual_binding("abc", "Acme Towers").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            guard.submit_manual_binding("42", "   ").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn manual_binding_persists_and_configures_next_resolve_offline() {
        let store = memory_store().await;
        let guard_offline = guard(store.clone(), MockGateway::new(), false);
        guard_offline
            .submit_manual_binding("42", "Acme Towers")
            .await
            .unwrap();

        // Simulates the post-reload resolve, still offline: configured with
        // no remote round trip (the mock gateway would panic if called).
        let state = guard_offline.resolve().await.unwrap();
        match state {
            ProvisioningState::Configured {
                condominium_id,
                condominium_name,
                ..
            } => {
                assert_eq!(condominium_id, 42);
                assert_eq!(condominium_name, "Acme Towers");
            }
            other => panic!("expected Configured, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn provisional_binding_reconciles_once_connectivity_returns() {
        let store = memory_store().await;
        let seed = guard(store.clone(), MockGateway::new(), false);
        seed.submit_manual_binding("42", "Acme Towers").await.unwrap();

        let mut gateway = MockGateway::new();
        gateway
            .expect_register_device()
            .times(1)
            .withf(|device| device.condominium_id == 42)
            .returning(|_| true);
        let guard_online = guard(store.clone(), gateway, true);

        let state = guard_online.resolve().await.unwrap();
        assert!(matches!(state, ProvisioningState::Configured { .. }));
        assert!(store.get_offline_binding().await.unwrap().unwrap().reconciled);

        // A second resolve must not register again (times(1) above).
        let state = guard_online.resolve().await.unwrap();
        assert!(matches!(state, ProvisioningState::Configured { .. }));
    }
}
