//! Locally stored, encrypted license credential.
//!
//! The last license key the service accepted is kept encrypted in one file;
//! the symmetric key protecting it lives in a separate owner-only key file,
//! created on first use.

use crate::error::{LicenseError, LicenseResult};
use marketjournal_crypto::{KeyFile, SecretFile};
use marketjournal_types::LicenseKey;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default credential file name, relative to the home directory.
pub const LICENSE_FILE_NAME: &str = ".license_key";
/// Default key file name, relative to the home directory.
pub const ENCRYPTION_KEY_FILE_NAME: &str = ".encryption_key";

/// The device's stored license key.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    license: SecretFile,
    key: KeyFile,
}

impl CredentialStore {
    pub fn new(license_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            license: SecretFile::new(license_path),
            key: KeyFile::new(key_path),
        }
    }

    /// Store rooted at the user's home directory.
    pub fn in_home() -> LicenseResult<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            LicenseError::CredentialStorage("could not determine home directory".to_string())
        })?;
        Ok(Self::new(
            home.join(LICENSE_FILE_NAME),
            home.join(ENCRYPTION_KEY_FILE_NAME),
        ))
    }

    pub fn license_path(&self) -> &Path {
        self.license.path()
    }

    pub fn key_file(&self) -> &KeyFile {
        &self.key
    }

    /// Returns the stored license key if present and decryptable.
    ///
    /// A credential that fails to decrypt is reported as absent so the user
    /// is prompted for a fresh key. Failing to read or create the key file is
    /// an error.
    pub fn load(&self) -> LicenseResult<Option<LicenseKey>> {
        if !self.license.exists() {
            return Ok(None);
        }

        let key = self.key.load_or_create()?;
        match self.license.read(&key) {
            Ok(Some(raw)) => match LicenseKey::new(raw) {
                Ok(license) => Ok(Some(license)),
                Err(_) => {
                    warn!("Stored license file {:?} is empty", self.license.path());
                    Ok(None)
                }
            },
            Ok(None) => Ok(None),
            Err(e) => {
                warn!("Error reading license key file {:?}: {}", self.license.path(), e);
                Ok(None)
            }
        }
    }

    /// Encrypts and persists `license`, replacing any previous credential.
    pub fn save(&self, license: &LicenseKey) -> LicenseResult<()> {
        let key = self.key.load_or_create()?;
        self.license.write(&key, license.as_str())?;
        info!("License key saved locally");
        Ok(())
    }

    /// Deletes the stored credential. The key file is kept.
    pub fn clear(&self) -> LicenseResult<()> {
        self.license.remove()?;
        Ok(())
    }
}
