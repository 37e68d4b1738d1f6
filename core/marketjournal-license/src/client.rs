//! Talking to the license service.

use crate::error::{LicenseError, LicenseResult};
use async_trait::async_trait;
use marketjournal_types::{
    api::{HEALTH_PATH, VALIDATE_PATH},
    DeviceId, LicenseKey, ValidateRequest, ValidateResponse, ValidationOutcome,
};
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error};

/// Default timeout for every call to the service.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The two calls the activation flow makes against the service.
#[async_trait]
pub trait LicenseService: Send + Sync {
    /// Lightweight liveness check.
    async fn ping(&self) -> LicenseResult<()>;

    /// Presents `key` from `device`.
    ///
    /// `Ok` carries the service's decision whether valid or not; `Err` means
    /// no decision was obtained.
    async fn validate(&self, key: &LicenseKey, device: &DeviceId)
        -> LicenseResult<ValidateResponse>;
}

/// The error that best describes a negative validation reply.
#[must_use]
pub fn rejection_error(response: &ValidateResponse) -> LicenseError {
    match response.status {
        Some(ValidationOutcome::UnknownKey) => LicenseError::UnknownKey,
        Some(ValidationOutcome::BoundElsewhere) => LicenseError::AlreadyBoundElsewhere,
        _ => LicenseError::AuthorizationDenied {
            attempts: 1,
            reason: response.message.clone(),
        },
    }
}

/// [`LicenseService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLicenseClient {
    base_url: String,
    client: Client,
}

impl HttpLicenseClient {
    pub fn new(base_url: impl Into<String>) -> LicenseResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> LicenseResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LicenseError::ServerUnreachable(format!("HTTP client setup: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn unreachable(e: reqwest::Error) -> LicenseError {
    if e.is_timeout() {
        error!("License server request timed out: {}", e);
    } else if e.is_connect() {
        error!("Unable to connect to license server: {}", e);
    } else {
        error!("License server request failed: {}", e);
    }
    LicenseError::ServerUnreachable(e.to_string())
}

#[async_trait]
impl LicenseService for HttpLicenseClient {
    async fn ping(&self) -> LicenseResult<()> {
        let resp = self
            .client
            .get(self.url(HEALTH_PATH))
            .send()
            .await
            .map_err(unreachable)?;

        if !resp.status().is_success() {
            error!("License server accessibility check failed: HTTP {}", resp.status());
            return Err(LicenseError::ServerUnreachable(format!(
                "liveness check returned HTTP {}",
                resp.status()
            )));
        }
        debug!("License server at {} is reachable", self.base_url);
        Ok(())
    }

    async fn validate(
        &self,
        key: &LicenseKey,
        device: &DeviceId,
    ) -> LicenseResult<ValidateResponse> {
        let resp = self
            .client
            .post(self.url(VALIDATE_PATH))
            .json(&ValidateRequest::new(key.as_str(), device.as_str()))
            .send()
            .await
            .map_err(unreachable)?;

        match resp.status() {
            status if status.is_success() => resp.json::<ValidateResponse>().await.map_err(|e| {
                LicenseError::ServerUnreachable(format!("unreadable validation reply: {e}"))
            }),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = resp
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse().ok());
                Err(LicenseError::RateLimited { retry_after_secs })
            }
            StatusCode::BAD_REQUEST => {
                let message = resp
                    .json::<ValidateResponse>()
                    .await
                    .map(|r| r.message)
                    .unwrap_or_else(|_| "bad request".to_string());
                Err(LicenseError::InvalidRequest(message))
            }
            status => {
                error!("HTTP error occurred: {}", status);
                Err(LicenseError::ServerUnreachable(format!(
                    "validation returned HTTP {status}"
                )))
            }
        }
    }
}
