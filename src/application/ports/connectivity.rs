use async_trait::async_trait;

/// Answers "can the backend be reached right now". Probing is an idempotent
/// read; overlapping polls are harmless.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}
