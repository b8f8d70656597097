use crate::application::ports::remote_gateway::RemoteGateway;
use crate::domain::entities::{
    append_incident_note, AuditEntry, Condominium, Device, DeviceBinding, Incident, NewVisit,
    ServiceType, Staff, UnitWithResidents, Visit, VisitType, VisitUpdate,
};
use crate::domain::value_objects::{DeviceId, IncidentStatus, VisitId, VisitStatus};
use crate::shared::config::RemoteConfig;
use crate::shared::error::GatewayError;
use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

/// PostgREST-dialect client for the hosted relational store: `/rest/v1` for
/// tables and views, `/rest/v1/rpc` for server-side functions, `/storage/v1`
/// for the photo bucket.
///
/// Reads log failures and return neutral values; only the visit write path
/// raises typed [`GatewayError`]s. No retries here; that policy belongs to
/// the DataService.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    photo_bucket: String,
}

impl HttpGateway {
    pub fn new(config: &RemoteConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)?;
        headers.insert("apikey", key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            photo_bucket: config.photo_bucket.clone(),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, function)
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        operation: &str,
        table: &str,
        query: &[(&str, String)],
    ) -> Vec<T> {
        let result = self
            .client
            .get(self.rest_url(table))
            .query(query)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<Vec<T>>().await {
                    Ok(items) => items,
                    Err(e) => {
                        tracing::error!("{}: response decode failed: {}", operation, e);
                        Vec::new()
                    }
                }
            }
            Ok(response) => {
                tracing::error!("{}: remote returned {}", operation, response.status());
                Vec::new()
            }
            Err(e) => {
                tracing::error!("{}: request failed: {}", operation, e);
                Vec::new()
            }
        }
    }

    async fn patch(
        &self,
        operation: &str,
        table: &str,
        query: &[(&str, String)],
        body: &impl Serialize,
    ) -> bool {
        let result = self
            .client
            .patch(self.rest_url(table))
            .query(query)
            .json(body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::error!("{}: remote returned {}", operation, response.status());
                false
            }
            Err(e) => {
                tracing::error!("{}: request failed: {}", operation, e);
                false
            }
        }
    }
}

/// Maps a non-success write response to the typed error the sync pass
/// branches on: 409 is "the row already exists", other 4xx is a rejected
/// payload, everything else reads as connectivity.
fn write_error(status: StatusCode, body: String) -> GatewayError {
    if status == StatusCode::CONFLICT {
        GatewayError::Conflict(body)
    } else if status.is_client_error() {
        GatewayError::Rejected(format!("{}: {}", status, body))
    } else {
        GatewayError::Connectivity(format!("{}: {}", status, body))
    }
}

/// Splits a `data:image/jpeg;base64,...` URL into content type and raw bytes.
fn parse_data_url(data_url: &str) -> Option<(String, Vec<u8>)> {
    let rest = data_url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let content_type = meta.strip_suffix(";base64")?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()?;
    Some((content_type.to_string(), bytes))
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn get_condominium(&self, id: i64) -> Option<Condominium> {
        self.fetch_list::<Condominium>(
            "get_condominium",
            "condominiums",
            &[("id", format!("eq.{}", id)), ("limit", "1".to_string())],
        )
        .await
        .into_iter()
        .next()
    }

    async fn verify_staff_login(
        &self,
        first_name: &str,
        last_name: &str,
        pin: &str,
    ) -> Result<Option<Staff>, GatewayError> {
        // The PIN is compared against its hash inside the database function;
        // hash material never reaches this client.
        let response = self
            .client
            .post(self.rpc_url("verify_staff_login"))
            .json(&json!({
                "p_first_name": first_name,
                "p_last_name": last_name,
                "p_pin": pin,
            }))
            .send()
            .await
            .map_err(GatewayError::from)?;

        if !response.status().is_success() {
            return Err(GatewayError::Connectivity(format!(
                "verify_staff_login: remote returned {}",
                response.status()
            )));
        }

        // The function returns the staff row, or SQL null for bad credentials.
        let staff: Option<Staff> = response.json().await.map_err(GatewayError::from)?;
        Ok(staff)
    }

    async fn get_visit_types(&self) -> Vec<VisitType> {
        self.fetch_list("get_visit_types", "visit_types", &[("order", "id".to_string())])
            .await
    }

    async fn get_service_types(&self) -> Vec<ServiceType> {
        self.fetch_list(
            "get_service_types",
            "service_types",
            &[("order", "id".to_string())],
        )
        .await
    }

    async fn get_units_with_residents(&self, condominium_id: i64) -> Vec<UnitWithResidents> {
        // Flattened by the v_units_with_residents view on the remote side.
        self.fetch_list(
            "get_units_with_residents",
            "v_units_with_residents",
            &[("condominium_id", format!("eq.{}", condominium_id))],
        )
        .await
    }

    async fn get_todays_visits(&self, condominium_id: i64) -> Vec<Visit> {
        let midnight = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().to_rfc3339())
            .unwrap_or_default();
        // v_todays_visits joins type name and unit label into the row.
        self.fetch_list(
            "get_todays_visits",
            "v_todays_visits",
            &[
                ("condominium_id", format!("eq.{}", condominium_id)),
                ("created_at", format!("gte.{}", midnight)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn create_visit(&self, visit: &NewVisit) -> Result<Visit, GatewayError> {
        let response = self
            .client
            .post(self.rest_url("visits"))
            .header("Prefer", "return=representation")
            .json(visit)
            .send()
            .await
            .map_err(GatewayError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(write_error(status, body));
        }

        let mut rows: Vec<Visit> = response.json().await.map_err(GatewayError::from)?;
        rows.pop()
            .ok_or_else(|| GatewayError::Rejected("insert returned no row".into()))
    }

    async fn update_visit(&self, id: &VisitId, update: &VisitUpdate) -> bool {
        self.patch(
            "update_visit",
            "visits",
            &[("id", format!("eq.{}", id))],
            update,
        )
        .await
    }

    async fn update_visit_status(
        &self,
        id: &VisitId,
        status: VisitStatus,
        checked_out_at: Option<DateTime<Utc>>,
    ) -> bool {
        let mut body = json!({ "status": status });
        if let Some(at) = checked_out_at {
            body["checked_out_at"] = json!(at);
        }
        self.patch(
            "update_visit_status",
            "visits",
            &[("id", format!("eq.{}", id))],
            &body,
        )
        .await
    }

    async fn get_incidents(&self, condominium_id: i64) -> Vec<Incident> {
        self.fetch_list(
            "get_incidents",
            "v_incidents",
            &[
                ("condominium_id", format!("eq.{}", condominium_id)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn acknowledge_incident(&self, id: i64, staff_id: i64) -> bool {
        self.patch(
            "acknowledge_incident",
            "incidents",
            &[("id", format!("eq.{}", id))],
            &json!({
                "status": IncidentStatus::Acknowledged,
                "acknowledged_by": staff_id,
                "acknowledged_at": Utc::now(),
            }),
        )
        .await
    }

    async fn report_incident_action(&self, id: i64, notes: &str, status: IncidentStatus) -> bool {
        // Read-concatenate-write keeps the notes append-only: the new entry
        // is appended with a timestamp, prior entries stay untouched.
        let existing: Vec<serde_json::Value> = self
            .fetch_list(
                "report_incident_action",
                "incidents",
                &[
                    ("id", format!("eq.{}", id)),
                    ("select", "notes".to_string()),
                ],
            )
            .await;
        let Some(row) = existing.into_iter().next() else {
            tracing::error!("report_incident_action: incident {} not found", id);
            return false;
        };
        let prior = row.get("notes").and_then(|v| v.as_str());
        let combined = append_incident_note(prior, notes, Utc::now());

        self.patch(
            "report_incident_action",
            "incidents",
            &[("id", format!("eq.{}", id))],
            &json!({
                "status": status,
                "notes": combined,
                "updated_at": Utc::now(),
            }),
        )
        .await
    }

    async fn register_device(&self, device: &Device) -> bool {
        let result = self
            .client
            .post(self.rest_url("devices"))
            .header("Prefer", "resolution=merge-duplicates")
            .query(&[("on_conflict", "identifier")])
            .json(device)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::error!("register_device: remote returned {}", response.status());
                false
            }
            Err(e) => {
                tracing::error!("register_device: request failed: {}", e);
                false
            }
        }
    }

    async fn update_device_heartbeat(&self, identifier: &DeviceId) {
        let ok = self
            .patch(
                "update_device_heartbeat",
                "devices",
                &[("identifier", format!("eq.{}", identifier))],
                &json!({ "last_seen_at": Utc::now() }),
            )
            .await;
        if !ok {
            tracing::debug!("heartbeat for {} not recorded", identifier);
        }
    }

    async fn get_device_by_identifier(&self, identifier: &DeviceId) -> Option<DeviceBinding> {
        self.fetch_list::<DeviceBinding>(
            "get_device_by_identifier",
            "v_device_bindings",
            &[("identifier", format!("eq.{}", identifier))],
        )
        .await
        .into_iter()
        .next()
    }

    async fn get_active_devices(
        &self,
        condominium_id: i64,
        exclude_identifier: Option<DeviceId>,
    ) -> Vec<Device> {
        let mut query = vec![
            ("condominium_id", format!("eq.{}", condominium_id)),
            ("status", "eq.ACTIVE".to_string()),
        ];
        if let Some(exclude) = &exclude_identifier {
            query.push(("identifier", format!("neq.{}", exclude)));
        }
        self.fetch_list("get_active_devices", "devices", &query).await
    }

    async fn upload_photo(&self, data_url: &str, path_hint: &str) -> Option<String> {
        let Some((content_type, bytes)) = parse_data_url(data_url) else {
            tracing::error!("upload_photo: malformed data URL");
            return None;
        };
        let path = format!(
            "{}/{}.{}",
            path_hint.trim_matches('/'),
            Uuid::new_v4(),
            extension_for(&content_type)
        );
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.photo_bucket, path
        );

        let result = self
            .client
            .post(&url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => Some(format!(
                "{}/storage/v1/object/public/{}/{}",
                self.base_url, self.photo_bucket, path
            )),
            Ok(response) => {
                tracing::error!("upload_photo: remote returned {}", response.status());
                None
            }
            Err(e) => {
                tracing::error!("upload_photo: request failed: {}", e);
                None
            }
        }
    }

    async fn log_audit(&self, entry: &AuditEntry) {
        let result = self
            .client
            .post(self.rest_url("audit_log"))
            .json(entry)
            .send()
            .await;
        if let Err(e) = result {
            tracing::debug!("audit entry dropped: {}", e);
        }
    }
}
