//! The activation flow run before any data collection.

use crate::client::{rejection_error, LicenseService};
use crate::credential::CredentialStore;
use crate::device::{DeviceIdentity, DeviceInfo};
use crate::error::{LicenseError, LicenseResult};
use crate::prompt::{Notice, Prompt};
use marketjournal_types::{DeviceId, LicenseKey, ValidationOutcome};
use tracing::{debug, info, warn};

/// Default number of interactive attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Where the accepted license key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationSource {
    /// The locally stored credential was revalidated.
    Stored,
    /// The user entered the key during this run.
    Entered,
}

/// Proof that this run may proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub license_key: LicenseKey,
    pub device_id: DeviceId,
    pub source: AuthorizationSource,
    /// `None` when the service did not report a status.
    pub outcome: Option<ValidationOutcome>,
}

/// Drives the challenge/response exchange with the license service.
pub struct Activator<S, D, P> {
    service: S,
    device: D,
    credentials: CredentialStore,
    prompt: P,
}

impl<S, D, P> Activator<S, D, P>
where
    S: LicenseService,
    D: DeviceIdentity,
    P: Prompt,
{
    pub fn new(service: S, device: D, credentials: CredentialStore, prompt: P) -> Self {
        Self {
            service,
            device,
            credentials,
            prompt,
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Authorizes this run.
    ///
    /// Checks the service is reachable, revalidates the stored credential if
    /// there is one, then prompts up to `max_attempts` times (at least once).
    /// A key the service accepts is persisted before returning. Any error is
    /// final: the caller must not start collecting data.
    pub async fn authorize(&mut self, max_attempts: u32) -> LicenseResult<Authorization> {
        if let Err(e) = self.service.ping().await {
            self.report(&e);
            return Err(e);
        }

        let device_id = self.device.device_id()?;
        let info = DeviceInfo::collect();
        debug!(
            "Authorizing device {} ({} {}, host {})",
            device_id, info.os_name, info.arch, info.hostname
        );

        if let Some(stored) = self.credentials.load()? {
            let response = match self.service.validate(&stored, &device_id).await {
                Ok(response) => response,
                Err(e) => {
                    self.report(&e);
                    return Err(e);
                }
            };

            if response.valid {
                info!("Stored license key is valid");
                return Ok(Authorization {
                    license_key: stored,
                    device_id,
                    source: AuthorizationSource::Stored,
                    outcome: response.status,
                });
            }
            warn!("Stored license key rejected: {}", rejection_error(&response));
        }

        self.prompt_for_key(device_id, max_attempts.max(1)).await
    }

    async fn prompt_for_key(
        &mut self,
        device_id: DeviceId,
        max_attempts: u32,
    ) -> LicenseResult<Authorization> {
        let mut last_reason = String::new();

        for attempt in 1..=max_attempts {
            let last = attempt == max_attempts;

            let entered = self
                .prompt
                .ask_license_key(attempt, max_attempts)?
                .and_then(|raw| LicenseKey::new(raw).ok());
            let Some(license_key) = entered else {
                if last {
                    self.prompt.notify(Notice::NoKeyProvided);
                    return Err(LicenseError::NoKeyProvided);
                }
                continue;
            };

            let response = match self.service.validate(&license_key, &device_id).await {
                Ok(response) => response,
                Err(e) => {
                    self.report(&e);
                    return Err(e);
                }
            };

            if response.valid {
                if let Err(e) = self.credentials.save(&license_key) {
                    self.report(&e);
                    return Err(e);
                }
                info!("License key accepted on attempt {}", attempt);
                self.prompt.notify(Notice::Activated(response.message));
                return Ok(Authorization {
                    license_key,
                    device_id,
                    source: AuthorizationSource::Entered,
                    outcome: response.status,
                });
            }

            warn!("License key rejected on attempt {}: {}", attempt, response.message);
            self.prompt.notify(Notice::Rejected {
                message: response.message.clone(),
                will_retry: !last,
            });
            last_reason = response.message;
        }

        Err(LicenseError::AuthorizationDenied {
            attempts: max_attempts,
            reason: last_reason,
        })
    }

    fn report(&mut self, e: &LicenseError) {
        let notice = match e {
            LicenseError::ServerUnreachable(detail) => Notice::ServerUnreachable(detail.clone()),
            other => Notice::Failed(other.to_string()),
        };
        self.prompt.notify(notice);
    }
}
