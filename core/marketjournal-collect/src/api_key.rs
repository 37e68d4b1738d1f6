//! The Financial Modeling Prep API key.

use crate::error::{JournalError, JournalResult};
use dialoguer::Input;
use marketjournal_crypto::{KeyFile, SecretFile};
use std::path::PathBuf;
use tracing::{info, warn};

/// Default encrypted API key file name, relative to the home directory.
pub const API_KEY_FILE_NAME: &str = ".api_key";

/// An API key stored encrypted on disk, under the same key file as the
/// license credential.
#[derive(Debug, Clone)]
pub struct ApiKeyStore {
    secret: SecretFile,
    key: KeyFile,
}

impl ApiKeyStore {
    pub fn new(secret_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        Self {
            secret: SecretFile::new(secret_path),
            key: KeyFile::new(key_path),
        }
    }

    /// The stored key, or `None` if absent or unreadable.
    pub fn load(&self) -> JournalResult<Option<String>> {
        if !self.secret.exists() {
            return Ok(None);
        }
        let key = self.key.load_or_create()?;
        match self.secret.read(&key) {
            Ok(value) => Ok(value.filter(|v| !v.trim().is_empty())),
            Err(e) => {
                warn!("Error loading API key: {}", e);
                Ok(None)
            }
        }
    }

    pub fn save(&self, api_key: &str) -> JournalResult<()> {
        let key = self.key.load_or_create()?;
        self.secret.write(&key, api_key)?;
        info!("API key saved");
        Ok(())
    }

    /// Picks the key to use.
    ///
    /// An `explicit` key wins and is not stored. Otherwise the stored key is
    /// used; failing that `ask` is called once and its answer stored.
    pub fn resolve<F>(&self, explicit: Option<String>, ask: F) -> JournalResult<String>
    where
        F: FnOnce() -> JournalResult<Option<String>>,
    {
        if let Some(key) = explicit.filter(|k| !k.trim().is_empty()) {
            return Ok(key.trim().to_string());
        }

        if let Some(stored) = self.load()? {
            info!("API key loaded");
            return Ok(stored);
        }

        let entered = ask()?
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(JournalError::MissingApiKey("FMP"))?;
        self.save(&entered)?;
        Ok(entered)
    }
}

/// Asks for the FMP API key on the terminal.
pub fn prompt_fmp_key() -> JournalResult<Option<String>> {
    let entered: String = Input::new()
        .with_prompt("Please enter your FMP API key")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| JournalError::Prompt(e.to_string()))?;
    Ok(Some(entered))
}
