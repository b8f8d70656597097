use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    /// Absent remote section selects the no-backend mode: reads and writes
    /// stay local and login synthesizes a staff record.
    pub remote: Option<RemoteConfig>,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    pub photo_bucket: String,
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Heartbeat / online-check poll interval in seconds.
    pub heartbeat_interval: u64,
    /// Random extra delay bound (seconds) so a fleet of kiosks does not
    /// heartbeat in lockstep after a shared outage.
    pub heartbeat_jitter: u64,
    pub sync_on_reconnect: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/gatehouse.db".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            remote: None,
            sync: SyncConfig {
                heartbeat_interval: 60,
                heartbeat_jitter: 10,
                sync_on_reconnect: true,
            },
            storage: StorageConfig {
                data_dir: "./data".to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("GATEHOUSE_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("GATEHOUSE_DATA_DIR") {
            if !v.trim().is_empty() {
                cfg.storage.data_dir = v;
            }
        }

        // The remote section only materializes when both the URL and key are set.
        let base_url = std::env::var("GATEHOUSE_REMOTE_URL").ok();
        let api_key = std::env::var("GATEHOUSE_REMOTE_API_KEY").ok();
        if let (Some(base_url), Some(api_key)) = (base_url, api_key) {
            if !base_url.trim().is_empty() && !api_key.trim().is_empty() {
                cfg.remote = Some(RemoteConfig {
                    base_url: base_url.trim_end_matches('/').to_string(),
                    api_key,
                    photo_bucket: std::env::var("GATEHOUSE_PHOTO_BUCKET")
                        .unwrap_or_else(|_| "visit-photos".to_string()),
                    request_timeout: std::env::var("GATEHOUSE_REMOTE_TIMEOUT")
                        .ok()
                        .and_then(|v| parse_u64(&v))
                        .unwrap_or(15),
                });
            }
        }

        if let Ok(v) = std::env::var("GATEHOUSE_HEARTBEAT_INTERVAL") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.heartbeat_interval = value.max(5);
            }
        }
        if let Ok(v) = std::env::var("GATEHOUSE_HEARTBEAT_JITTER") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.heartbeat_jitter = value;
            }
        }
        if let Ok(v) = std::env::var("GATEHOUSE_SYNC_ON_RECONNECT") {
            cfg.sync.sync_on_reconnect = parse_bool(&v, cfg.sync.sync_on_reconnect);
        }

        cfg
    }
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_remote() {
        let cfg = AppConfig::default();
        assert!(cfg.remote.is_none());
        assert_eq!(cfg.sync.heartbeat_interval, 60);
    }

    #[test]
    fn parse_bool_falls_back_on_garbage() {
        assert!(parse_bool("yes", false));
        assert!(!parse_bool("off", true));
        assert!(parse_bool("banana", true));
    }
}
