use thiserror::Error;

/// Application-level error taxonomy.
///
/// Connectivity problems are recoverable by falling back to local data and are
/// never surfaced as blocking failures; only `Validation` and `Auth` reach the
/// operator directly.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Typed error for remote write operations.
///
/// The sync pass needs to tell "the row already exists" apart from "the
/// payload was rejected": only `Conflict` justifies the update fallback.
/// Read operations never raise this; they log and return neutral values.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Remote unreachable: {0}")]
    Connectivity(String),

    #[error("Record already exists: {0}")]
    Conflict(String),

    #[error("Rejected by remote: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Connectivity(err.to_string())
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Connectivity(msg) => AppError::Connectivity(msg),
            GatewayError::Conflict(msg) => AppError::Internal(msg),
            GatewayError::Rejected(msg) => AppError::Validation(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
