use crate::application::ports::HealthProbe;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

/// HEAD against the API health endpoint; any 2xx counts as reachable.
pub struct HttpHealthProbe {
    client: Client,
    health_url: Url,
}

impl HttpHealthProbe {
    pub fn new(health_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let health_url = Url::parse(health_url)
            .map_err(|err| AppError::ConfigurationError(format!("Invalid health URL: {err}")))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, health_url })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            &config.health_url(),
            Duration::from_millis(config.network.probe_timeout_ms),
        )
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn probe(&self) -> Result<(), AppError> {
        let response = self
            .client
            .head(self.health_url.clone())
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "Health check failed with status {status}"
            )));
        }
        Ok(())
    }
}
