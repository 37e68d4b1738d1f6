//! Device identification for license binding.
//!
//! The activation flow asks a [`DeviceIdentity`] for the id it presents to
//! the license service. [`HardwareFingerprint`] derives a stable id from
//! local hardware identifiers; [`FixedDeviceId`] returns a preset value.

use crate::error::{LicenseError, LicenseResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use marketjournal_types::DeviceId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::env;

/// Supplies the id this machine presents to the license service.
pub trait DeviceIdentity: Send + Sync {
    /// Must return the same id on every run on the same machine.
    fn device_id(&self) -> LicenseResult<DeviceId>;
}

/// A device identity that always returns the same preset id.
#[derive(Debug, Clone)]
pub struct FixedDeviceId(DeviceId);

impl FixedDeviceId {
    pub fn new(id: DeviceId) -> Self {
        Self(id)
    }
}

impl DeviceIdentity for FixedDeviceId {
    fn device_id(&self) -> LicenseResult<DeviceId> {
        Ok(self.0.clone())
    }
}

/// Information about the current device, logged at activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub os_name: String,
    pub hostname: String,
    pub arch: String,
}

impl DeviceInfo {
    #[must_use]
    pub fn collect() -> Self {
        Self {
            os_name: env::consts::OS.to_string(),
            hostname: get_hostname(),
            arch: env::consts::ARCH.to_string(),
        }
    }
}

/// Derives the device id from a hash of hardware identifiers.
///
/// Combines OS, architecture, hostname, the platform machine id and the
/// login name, hashes them with SHA-256 and keeps the first 16 bytes. No
/// network access is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardwareFingerprint;

impl HardwareFingerprint {
    /// Computes the fingerprint string for this machine.
    #[must_use]
    pub fn compute() -> String {
        fingerprint(&collect_hardware_ids())
    }
}

impl DeviceIdentity for HardwareFingerprint {
    fn device_id(&self) -> LicenseResult<DeviceId> {
        DeviceId::new(Self::compute()).map_err(|e| LicenseError::DeviceIdentity(e.to_string()))
    }
}

/// Hashes identifier components into a short URL-safe id.
pub(crate) fn fingerprint(components: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(components.join("|").as_bytes());
    let hash = hasher.finalize();
    URL_SAFE_NO_PAD.encode(&hash[..16])
}

fn collect_hardware_ids() -> Vec<String> {
    let mut ids = vec![env::consts::OS.to_string(), env::consts::ARCH.to_string()];

    ids.push(get_hostname());

    if let Some(machine_id) = get_machine_id() {
        ids.push(machine_id);
    }

    if let Ok(user) = env::var("USER").or_else(|_| env::var("USERNAME")) {
        ids.push(user);
    }

    ids
}

fn get_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Platform machine id, if the OS exposes one.
fn get_machine_id() -> Option<String> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("ioreg")
            .args(["-rd1", "-c", "IOPlatformExpertDevice"])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .and_then(|output| {
                output
                    .lines()
                    .find(|l| l.contains("IOPlatformUUID"))
                    .and_then(|l| l.split('"').nth(3))
                    .map(String::from)
            })
    }

    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/etc/machine-id")
            .or_else(|_| std::fs::read_to_string("/var/lib/dbus/machine-id"))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    // TODO: read HKLM\SOFTWARE\Microsoft\Cryptography\MachineGuid on Windows.
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        None
    }
}
