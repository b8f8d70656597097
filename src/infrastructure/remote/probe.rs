use crate::application::ports::connectivity::ConnectivityProbe;
use crate::shared::config::RemoteConfig;
use async_trait::async_trait;

/// Answers the online check with a cheap HEAD against the REST root. Any
/// response at all counts as reachable; only transport failures read as
/// offline.
pub struct HttpConnectivityProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpConnectivityProbe {
    pub fn new(config: &RemoteConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/rest/v1/", config.base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ConnectivityProbe for HttpConnectivityProbe {
    async fn is_online(&self) -> bool {
        self.client.head(&self.url).send().await.is_ok()
    }
}

/// Probe for the no-backend mode: never online, so every code path stays on
/// the local branch.
pub struct OfflineProbe;

#[async_trait]
impl ConnectivityProbe for OfflineProbe {
    async fn is_online(&self) -> bool {
        false
    }
}
