use crate::application::ports::local_store::LocalStore;
use crate::domain::entities::{OfflineBinding, ServiceType, UnitWithResidents, Visit, VisitType};
use crate::domain::value_objects::DeviceId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::Row;

use super::connection_pool::ConnectionPool;

const KEY_DEVICE_ID: &str = "device_id";
const KEY_OFFLINE_BINDING: &str = "offline_binding";
const KEY_VISIT_TYPES: &str = "cache:visit_types";
const KEY_SERVICE_TYPES: &str = "cache:service_types";
const KEY_UNITS: &str = "cache:units";

/// SQLite-backed durable store: the visit queue in `visit_queue`, everything
/// keyed (identity, binding, config caches) in `kv_store`.
pub struct SqliteLocalStore {
    pool: ConnectionPool,
}

impl SqliteLocalStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    async fn get_kv(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(self.pool.get_pool())
            .await?;
        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    async fn set_kv(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp())
        .execute(self.pool.get_pool())
        .await?;
        Ok(())
    }

    async fn load_json_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, AppError> {
        match self.get_kv(key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save_json_list<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), AppError> {
        self.set_kv(key, &serde_json::to_string(items)?).await
    }
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    async fn load_visits(&self) -> Result<Vec<Visit>, AppError> {
        let rows = sqlx::query("SELECT payload FROM visit_queue ORDER BY position ASC")
            .fetch_all(self.pool.get_pool())
            .await?;

        let mut visits = Vec::with_capacity(rows.len());
        for row in rows {
            let payload: String = row.get("payload");
            visits.push(serde_json::from_str(&payload)?);
        }
        Ok(visits)
    }

    /// Whole-collection replace inside one transaction; a reader sees either
    /// the full prior contents or the full new contents, never a partial
    /// write.
    async fn save_visits(&self, visits: &[Visit]) -> Result<(), AppError> {
        let mut tx = self.pool.get_pool().begin().await?;

        sqlx::query("DELETE FROM visit_queue")
            .execute(&mut *tx)
            .await?;

        for (position, visit) in visits.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO visit_queue (visit_id, payload, sync_status, position)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(visit.id.as_str())
            .bind(serde_json::to_string(visit)?)
            .bind(visit.sync_status.as_str())
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn load_visit_types(&self) -> Result<Vec<VisitType>, AppError> {
        self.load_json_list(KEY_VISIT_TYPES).await
    }

    async fn save_visit_types(&self, types: &[VisitType]) -> Result<(), AppError> {
        self.save_json_list(KEY_VISIT_TYPES, types).await
    }

    async fn load_service_types(&self) -> Result<Vec<ServiceType>, AppError> {
        self.load_json_list(KEY_SERVICE_TYPES).await
    }

    async fn save_service_types(&self, types: &[ServiceType]) -> Result<(), AppError> {
        self.save_json_list(KEY_SERVICE_TYPES, types).await
    }

    async fn load_units(&self) -> Result<Vec<UnitWithResidents>, AppError> {
        self.load_json_list(KEY_UNITS).await
    }

    async fn save_units(&self, units: &[UnitWithResidents]) -> Result<(), AppError> {
        self.save_json_list(KEY_UNITS, units).await
    }

    async fn get_device_id(&self) -> Result<Option<DeviceId>, AppError> {
        match self.get_kv(KEY_DEVICE_ID).await? {
            Some(raw) => DeviceId::new(raw)
                .map(Some)
                .map_err(AppError::Storage),
            None => Ok(None),
        }
    }

    async fn set_device_id(&self, id: &DeviceId) -> Result<(), AppError> {
        self.set_kv(KEY_DEVICE_ID, id.as_str()).await
    }

    async fn get_offline_binding(&self) -> Result<Option<OfflineBinding>, AppError> {
        match self.get_kv(KEY_OFFLINE_BINDING).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set_offline_binding(&self, binding: &OfflineBinding) -> Result<(), AppError> {
        self.set_kv(KEY_OFFLINE_BINDING, &serde_json::to_string(binding)?)
            .await
    }
}
