//! Owner-only key and secret files.

use crate::cipher::{decrypt_string, encrypt_string};
use crate::error::CryptoResult;
use crate::key::{generate_random_key, SecretKey};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A file holding the symmetric key that protects local secrets.
#[derive(Debug, Clone)]
pub struct KeyFile {
    path: PathBuf,
}

impl KeyFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the key, generating and persisting a new one if the file is missing.
    ///
    /// A file that exists but does not decode is an error. Replacing it would
    /// orphan every secret encrypted under the old key.
    pub fn load_or_create(&self) -> CryptoResult<SecretKey> {
        match fs::read_to_string(&self.path) {
            Ok(encoded) => {
                debug!("Loaded encryption key from {:?}", self.path);
                SecretKey::from_base64(&encoded)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let key = generate_random_key();
                write_private(&self.path, key.to_base64().as_bytes())?;
                info!("Generated new encryption key at {:?}", self.path);
                Ok(key)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// A file holding one encrypted string.
#[derive(Debug, Clone)]
pub struct SecretFile {
    path: PathBuf,
}

impl SecretFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads and decrypts the secret. Returns `None` when the file is absent.
    pub fn read(&self, key: &SecretKey) -> CryptoResult<Option<String>> {
        let encoded = match fs::read_to_string(&self.path) {
            Ok(encoded) => encoded,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        decrypt_string(key, &encoded).map(Some)
    }

    /// Encrypts `plaintext` and writes it with owner-only permissions.
    pub fn write(&self, key: &SecretKey, plaintext: &str) -> CryptoResult<()> {
        let encoded = encrypt_string(key, plaintext)?;
        write_private(&self.path, encoded.as_bytes())?;
        Ok(())
    }

    /// Removes the secret file if present.
    pub fn remove(&self) -> CryptoResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Writes `contents` to `path` readable and writable by the owner only.
///
/// The data goes to a sibling temp file first and is renamed over `path`, so
/// an interrupted write never leaves a truncated key or secret behind.
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&tmp)?;
    // `mode` only applies on creation; a stale temp file may be wider.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, path)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
