use super::envelope::ApiEnvelope;
use crate::application::ports::{
    AttendanceAck, AttendanceGateway, AttendanceSyncRequest, GatewayError,
};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

pub struct HttpAttendanceGateway {
    client: Client,
    scan_url: Url,
}

impl HttpAttendanceGateway {
    pub fn new(scan_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let scan_url = Url::parse(scan_url)
            .map_err(|err| AppError::ConfigurationError(format!("Invalid scan URL: {err}")))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, scan_url })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            &config.scan_url(),
            Duration::from_secs(config.network.request_timeout),
        )
    }
}

#[async_trait]
impl AttendanceGateway for HttpAttendanceGateway {
    async fn submit_scan(
        &self,
        request: &AttendanceSyncRequest,
    ) -> Result<AttendanceAck, GatewayError> {
        let response = self
            .client
            .post(self.scan_url.clone())
            .json(request)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_send_error)?;

        match serde_json::from_str::<ApiEnvelope>(&body) {
            Ok(envelope) if envelope.success && status.is_success() => {
                Ok(AttendanceAck {
                    data: envelope.data,
                })
            }
            Ok(envelope) if envelope.success => Err(GatewayError::HttpStatus {
                status: status.as_u16(),
            }),
            Ok(envelope) => Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: envelope
                    .error
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| "scan rejected".to_string()),
            }),
            Err(_) if !status.is_success() => Err(GatewayError::HttpStatus {
                status: status.as_u16(),
            }),
            Err(err) => Err(GatewayError::MalformedResponse(err.to_string())),
        }
    }
}

fn map_send_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout(err.to_string())
    } else {
        GatewayError::Transport(err.to_string())
    }
}
