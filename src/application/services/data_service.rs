use crate::application::ports::connectivity::ConnectivityProbe;
use crate::application::ports::local_store::LocalStore;
use crate::application::ports::remote_gateway::RemoteGateway;
use crate::domain::entities::{
    ApprovalMode, AuditEntry, Condominium, Device, DeviceBinding, Incident, NewVisit, ServiceType,
    Staff, UnitWithResidents, Visit, VisitType, VisitUpdate,
};
use crate::domain::value_objects::{DeviceId, IncidentStatus, SyncStatus, VisitId, VisitStatus};
use crate::shared::error::{AppError, GatewayError};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Input for a new access event, as captured by the entry form.
#[derive(Debug, Clone)]
pub struct NewVisitRequest {
    pub visitor_name: String,
    pub visitor_document: Option<String>,
    pub visitor_phone: Option<String>,
    pub visit_type: VisitType,
    pub service_type_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub approval_mode: ApprovalMode,
    pub photo_data_url: Option<String>,
    pub qr_token: Option<String>,
    pub guard_id: Option<i64>,
}

/// Outcome of one explicit sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub synced: u32,
    /// Records that stayed `PENDING_SYNC` after the pass. A non-zero count
    /// after several passes is the caller's cue to escalate.
    pub failed: u32,
}

#[derive(Debug, Clone)]
struct Session {
    staff: Option<Staff>,
    condominium_id: i64,
}

/// The façade the UI calls. Decides per operation whether the authoritative
/// source is local, remote, or merged. Every queue read-modify-write runs
/// under `queue_lock`; the deployment model assumes a single writer.
pub struct DataService {
    store: Arc<dyn LocalStore>,
    gateway: Arc<dyn RemoteGateway>,
    probe: Arc<dyn ConnectivityProbe>,
    has_remote: bool,
    session: RwLock<Option<Session>>,
    queue_lock: Mutex<()>,
    sync_in_flight: AtomicBool,
}

impl DataService {
    pub fn new(
        store: Arc<dyn LocalStore>,
        gateway: Arc<dyn RemoteGateway>,
        probe: Arc<dyn ConnectivityProbe>,
        has_remote: bool,
    ) -> Self {
        Self {
            store,
            gateway,
            probe,
            has_remote,
            session: RwLock::new(None),
            queue_lock: Mutex::new(()),
            sync_in_flight: AtomicBool::new(false),
        }
    }

    async fn online(&self) -> bool {
        self.has_remote && self.probe.is_online().await
    }

    pub async fn active_condominium(&self) -> Option<i64> {
        self.session.read().await.as_ref().map(|s| s.condominium_id)
    }

    pub async fn active_staff(&self) -> Option<Staff> {
        self.session
            .read()
            .await
            .as_ref()
            .and_then(|s| s.staff.clone())
    }

    /// Binds the session's condominium without a login, e.g. after the
    /// provisioning guard resolved an offline binding.
    pub async fn bind_condominium(&self, condominium_id: i64) {
        let mut session = self.session.write().await;
        match session.as_mut() {
            Some(s) => s.condominium_id = condominium_id,
            None => {
                *session = Some(Session {
                    staff: None,
                    condominium_id,
                });
            }
        }
    }

    /// Verifies guard credentials and binds the session. `Ok(None)` is
    /// "invalid PIN", `Err(Connectivity)` is "could not reach the backend";
    /// the UI needs the two kept apart.
    pub async fn login(
        &self,
        first_name: &str,
        last_name: &str,
        pin: &str,
    ) -> Result<Option<Staff>, AppError> {
        if first_name.trim().is_empty() || last_name.trim().is_empty() {
            return Err(AppError::Validation("Name fields are required".into()));
        }

        if !self.has_remote {
            let mut staff =
                Staff::local_fallback(first_name.to_string(), last_name.to_string());
            if let Some(binding) = self.store.get_offline_binding().await? {
                staff.condominium_id = binding.condominium_id;
            }
            let condominium_id = staff.condominium_id;
            *self.session.write().await = Some(Session {
                staff: Some(staff.clone()),
                condominium_id,
            });
            return Ok(Some(staff));
        }

        let staff = self
            .gateway
            .verify_staff_login(first_name, last_name, pin)
            .await
            .map_err(AppError::from)?;

        let Some(staff) = staff else {
            return Ok(None);
        };

        let condominium_id = staff.condominium_id;
        *self.session.write().await = Some(Session {
            staff: Some(staff.clone()),
            condominium_id,
        });

        self.spawn_cache_refresh(condominium_id);
        self.spawn_audit(
            AuditEntry::new(condominium_id, staff.display_name(), "login"),
        );

        Ok(Some(staff))
    }

    /// Detached cache refresh; login never waits on it.
    fn spawn_cache_refresh(&self, condominium_id: i64) {
        let store = self.store.clone();
        let gateway = self.gateway.clone();
        tokio::spawn(async move {
            let visit_types = gateway.get_visit_types().await;
            if !visit_types.is_empty() {
                if let Err(e) = store.save_visit_types(&visit_types).await {
                    tracing::warn!("visit type cache refresh failed: {}", e);
                }
            }
            let service_types = gateway.get_service_types().await;
            if !service_types.is_empty() {
                if let Err(e) = store.save_service_types(&service_types).await {
                    tracing::warn!("service type cache refresh failed: {}", e);
                }
            }
            let units = gateway.get_units_with_residents(condominium_id).await;
            if !units.is_empty() {
                if let Err(e) = store.save_units(&units).await {
                    tracing::warn!("unit cache refresh failed: {}", e);
                }
            }
        });
    }

    fn spawn_audit(&self, entry: AuditEntry) {
        let gateway = self.gateway.clone();
        tokio::spawn(async move {
            gateway.log_audit(&entry).await;
        });
    }

    /// Cached reference data, stale-while-revalidate.
    pub async fn visit_types(&self) -> Result<Vec<VisitType>, AppError> {
        let cached = self.store.load_visit_types().await?;
        if self.online().await {
            if let Some(condominium_id) = self.active_condominium().await {
                self.spawn_cache_refresh(condominium_id);
            }
            if cached.is_empty() {
                let fresh = self.gateway.get_visit_types().await;
                if !fresh.is_empty() {
                    self.store.save_visit_types(&fresh).await?;
                    return Ok(fresh);
                }
            }
        }
        Ok(cached)
    }

    pub async fn service_types(&self) -> Result<Vec<ServiceType>, AppError> {
        let cached = self.store.load_service_types().await?;
        if cached.is_empty() && self.online().await {
            let fresh = self.gateway.get_service_types().await;
            if !fresh.is_empty() {
                self.store.save_service_types(&fresh).await?;
                return Ok(fresh);
            }
        }
        Ok(cached)
    }

    pub async fn units_with_residents(&self) -> Result<Vec<UnitWithResidents>, AppError> {
        let cached = self.store.load_units().await?;
        if cached.is_empty() && self.online().await {
            if let Some(condominium_id) = self.active_condominium().await {
                let fresh = self.gateway.get_units_with_residents(condominium_id).await;
                if !fresh.is_empty() {
                    self.store.save_units(&fresh).await?;
                    return Ok(fresh);
                }
            }
        }
        Ok(cached)
    }

    /// Today's visits: local queue first, remote merged on top when online.
    /// An empty remote result (the gateway returns empty on error) leaves
    /// the local cache authoritative.
    pub async fn todays_visits(&self) -> Result<Vec<Visit>, AppError> {
        let _guard = self.queue_lock.lock().await;
        let local = self.store.load_visits().await?;

        if !self.online().await {
            return Ok(local);
        }
        let Some(condominium_id) = self.active_condominium().await else {
            return Ok(local);
        };

        let remote = self.gateway.get_todays_visits(condominium_id).await;
        if remote.is_empty() {
            return Ok(local);
        }

        let merged = merge_visits(local, remote);
        self.store.save_visits(&merged).await?;
        Ok(merged)
    }

    /// Creates a visit, local-first: queued as `PENDING_SYNC` with a
    /// locally-generated id, one immediate push attempted when online. A
    /// failed push waits for the next explicit sync pass.
    pub async fn create_visit(&self, request: NewVisitRequest) -> Result<Visit, AppError> {
        if request.visitor_name.trim().is_empty() {
            return Err(AppError::Validation("Visitor name is required".into()));
        }
        if request.visit_type.requires_unit && request.unit_id.is_none() {
            return Err(AppError::Validation(
                "A destination unit is required for this visit type".into(),
            ));
        }
        let Some(condominium_id) = self.active_condominium().await else {
            return Err(AppError::Validation("No active condominium bound".into()));
        };

        let online = self.online().await;
        let now = Utc::now();

        let mut photo_url = None;
        let mut pending_photo = None;
        if let Some(data_url) = request.photo_data_url {
            if online {
                photo_url = self
                    .gateway
                    .upload_photo(&data_url, &format!("{}/visits", condominium_id))
                    .await;
            }
            if photo_url.is_none() {
                // Kept with the queued record; the sync pass uploads it.
                pending_photo = Some(data_url);
            }
        }

        // Free-entry categories bypass approval.
        let status = if request.visit_type.free_entry {
            VisitStatus::Approved
        } else {
            VisitStatus::Pending
        };

        let mut visit = Visit {
            id: VisitId::generate(),
            condominium_id,
            visitor_name: request.visitor_name,
            visitor_document: request.visitor_document,
            visitor_phone: request.visitor_phone,
            visit_type_id: request.visit_type.id,
            service_type_id: request.service_type_id,
            unit_id: request.unit_id,
            status,
            approval_mode: if request.visit_type.free_entry {
                ApprovalMode::FreeEntry
            } else {
                request.approval_mode
            },
            checked_in_at: None,
            checked_out_at: None,
            photo_url,
            pending_photo,
            qr_token: request.qr_token,
            guard_id: request.guard_id,
            sync_status: SyncStatus::PendingSync,
            created_at: now,
            type_name: Some(request.visit_type.name.clone()),
            unit_label: None,
        };

        let _guard = self.queue_lock.lock().await;
        let mut visits = self.store.load_visits().await?;

        if online {
            match self.gateway.create_visit(&NewVisit::from_visit(&visit)).await {
                Ok(_) => visit.mark_synced(),
                Err(e) => {
                    tracing::warn!("create_visit push failed, queued for sync: {}", e);
                }
            }
        }

        visits.insert(0, visit.clone());
        self.store.save_visits(&visits).await?;

        Ok(visit)
    }

    /// Applies a status transition (approve / deny / check-in / check-out) to
    /// a queued visit and attempts an immediate remote update when online.
    pub async fn update_visit_status(
        &self,
        id: &VisitId,
        status: VisitStatus,
    ) -> Result<Visit, AppError> {
        let now = Utc::now();

        let _guard = self.queue_lock.lock().await;
        let mut visits = self.store.load_visits().await?;
        let visit = visits
            .iter_mut()
            .find(|v| &v.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Visit {} not in local queue", id)))?;

        visit.transition(status, now);

        if self.online().await {
            let pushed = self
                .gateway
                .update_visit_status(id, status, visit.checked_out_at)
                .await;
            if pushed {
                visit.mark_synced();
            }
        }

        let updated = visit.clone();
        self.store.save_visits(&visits).await?;
        drop(_guard);

        if let Some(staff) = self.active_staff().await {
            self.spawn_audit(
                AuditEntry::new(updated.condominium_id, staff.display_name(), "visit_status")
                    .with_detail(format!("{} -> {}", updated.id, status)),
            );
        }

        Ok(updated)
    }

    /// Pushes every `PENDING_SYNC` record: insert first, update only on
    /// `Conflict`. Rejected payloads and connectivity failures stay pending.
    /// A second call while one is in flight is a no-op.
    pub async fn sync_pending_visits(&self) -> Result<SyncSummary, AppError> {
        if self
            .sync_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("sync pass already in flight, skipping");
            return Ok(SyncSummary::default());
        }

        let result = self.run_sync_pass().await;
        self.sync_in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn run_sync_pass(&self) -> Result<SyncSummary, AppError> {
        let _guard = self.queue_lock.lock().await;
        let mut visits = self.store.load_visits().await?;
        let mut summary = SyncSummary::default();
        let mut dirty = false;

        for visit in visits.iter_mut().filter(|v| v.sync_status.is_pending()) {
            if let Some(data_url) = visit.pending_photo.clone() {
                let path_hint = format!("{}/visits", visit.condominium_id);
                match self.gateway.upload_photo(&data_url, &path_hint).await {
                    Some(url) => {
                        visit.photo_url = Some(url);
                        visit.pending_photo = None;
                        dirty = true;
                    }
                    None => {
                        // Record stays pending until its photo lands.
                        summary.failed += 1;
                        continue;
                    }
                }
            }
            match self.gateway.create_visit(&NewVisit::from_visit(visit)).await {
                Ok(_) => {
                    visit.mark_synced();
                    summary.synced += 1;
                    dirty = true;
                }
                Err(GatewayError::Conflict(_)) => {
                    // The row exists remotely; this pending record is a
                    // status mutation of an already-created visit.
                    let update = VisitUpdate {
                        status: Some(visit.status),
                        checked_in_at: visit.checked_in_at,
                        checked_out_at: visit.checked_out_at,
                        photo_url: visit.photo_url.clone(),
                    };
                    if self.gateway.update_visit(&visit.id, &update).await {
                        visit.mark_synced();
                        summary.synced += 1;
                        dirty = true;
                    } else {
                        summary.failed += 1;
                    }
                }
                Err(GatewayError::Rejected(msg)) => {
                    tracing::warn!("visit {} rejected by remote: {}", visit.id, msg);
                    summary.failed += 1;
                }
                Err(GatewayError::Connectivity(msg)) => {
                    tracing::debug!("visit {} not pushed, offline: {}", visit.id, msg);
                    summary.failed += 1;
                }
            }
        }

        if dirty {
            self.store.save_visits(&visits).await?;
        }

        Ok(summary)
    }

    // Incident operations pass straight through; the append-only note
    // semantics live behind the gateway contract.

    pub async fn incidents(&self) -> Vec<Incident> {
        match self.active_condominium().await {
            Some(condominium_id) if self.online().await => {
                self.gateway.get_incidents(condominium_id).await
            }
            _ => Vec::new(),
        }
    }

    pub async fn acknowledge_incident(&self, id: i64, staff_id: i64) -> bool {
        self.gateway.acknowledge_incident(id, staff_id).await
    }

    pub async fn report_incident_action(
        &self,
        id: i64,
        notes: &str,
        status: IncidentStatus,
    ) -> Result<bool, AppError> {
        if notes.trim().is_empty() {
            return Err(AppError::Validation("Incident notes cannot be empty".into()));
        }
        Ok(self.gateway.report_incident_action(id, notes, status).await)
    }

    /// Condominium lookup for the online setup / admin flow.
    pub async fn condominium(&self, id: i64) -> Option<Condominium> {
        self.gateway.get_condominium(id).await
    }

    // Device passthroughs used by the provisioning guard and the admin flow.

    pub async fn device_binding(&self, identifier: &DeviceId) -> Option<DeviceBinding> {
        self.gateway.get_device_by_identifier(identifier).await
    }

    pub async fn register_device(&self, device: &Device) -> bool {
        self.gateway.register_device(device).await
    }

    /// Single-active-device check for the admin flow: other ACTIVE devices
    /// bound to the condominium, excluding this kiosk.
    pub async fn other_active_devices(&self, condominium_id: i64, own: &DeviceId) -> Vec<Device> {
        self.gateway
            .get_active_devices(condominium_id, Some(own.clone()))
            .await
    }
}

/// Trust-remote-when-present merge: remote wins for every id it covers,
/// local `PENDING_SYNC` records absent remotely are prepended in queue order.
fn merge_visits(local: Vec<Visit>, remote: Vec<Visit>) -> Vec<Visit> {
    let mut merged: Vec<Visit> = local
        .into_iter()
        .filter(|v| v.sync_status.is_pending() && !remote.iter().any(|r| r.id == v.id))
        .collect();
    merged.extend(remote);
    merged
}
