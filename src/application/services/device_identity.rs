use crate::application::ports::local_store::LocalStore;
use crate::domain::value_objects::DeviceId;
use crate::shared::error::AppError;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Resolved identity for this kiosk install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub id: DeviceId,
    /// False when durable storage was unavailable and the id lives only in
    /// memory. The binding will not survive a reload in that mode.
    pub persisted: bool,
}

/// Derives and pins the per-install device identifier. The first resolution
/// generates a UUID and persists it; every later call returns the identical
/// value, surviving reloads and app updates.
pub struct DeviceIdentityService {
    store: Arc<dyn LocalStore>,
    cached: RwLock<Option<DeviceIdentity>>,
}

impl DeviceIdentityService {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            store,
            cached: RwLock::new(None),
        }
    }

    pub async fn resolve(&self) -> Result<DeviceIdentity, AppError> {
        if let Some(identity) = self.cached.read().await.clone() {
            return Ok(identity);
        }

        let mut cached = self.cached.write().await;
        // Another caller may have resolved while we waited for the lock.
        if let Some(identity) = cached.clone() {
            return Ok(identity);
        }

        let identity = match self.store.get_device_id().await {
            Ok(Some(id)) => DeviceIdentity {
                id,
                persisted: true,
            },
            Ok(None) => {
                let id = DeviceId::generate();
                match self.store.set_device_id(&id).await {
                    Ok(()) => DeviceIdentity {
                        id,
                        persisted: true,
                    },
                    Err(e) => {
                        tracing::warn!(
                            "device id not persisted, session-only identity: {}",
                            e
                        );
                        DeviceIdentity {
                            id,
                            persisted: false,
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!("local storage unavailable, session-only identity: {}", e);
                DeviceIdentity {
                    id: DeviceId::generate(),
                    persisted: false,
                }
            }
        };

        *cached = Some(identity.clone());
        Ok(identity)
    }
}
