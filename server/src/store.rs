//! Persistent license records backed by SQLite.
//!
//! One table, `licenses (license_key PRIMARY KEY, device_id NULLABLE)`.
//! Every read-decide-write sequence runs under the connection mutex inside a
//! `BEGIN IMMEDIATE` transaction, so two first-time validations of the same
//! key can never both observe an unbound record.

use crate::error::{StoreError, StoreResult};
use marketjournal_types::{DeviceId, LicenseKey, LicenseRecord, ValidationOutcome};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

const ISSUE_ATTEMPTS: u32 = 3;

/// Persistent store for license records.
pub struct LicenseStore {
    conn: Mutex<Connection>,
}

impl LicenseStore {
    /// Opens (or creates) a license database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS licenses (
                license_key TEXT PRIMARY KEY,
                device_id TEXT
            );
            ",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Mints a new unbound license and returns its key.
    pub fn issue(&self) -> StoreResult<LicenseKey> {
        let conn = self.lock()?;
        for _ in 0..ISSUE_ATTEMPTS {
            let key = LicenseKey::generate();
            match conn.execute(
                "INSERT INTO licenses (license_key, device_id) VALUES (?1, NULL)",
                params![key.as_str()],
            ) {
                Ok(_) => {
                    info!("New license key generated: {}", key);
                    return Ok(key);
                }
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    warn!("License key collision on {}, retrying", key);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(StoreError::KeyExhausted(ISSUE_ATTEMPTS))
    }

    /// Presents `key` from `device`, binding the key on first use.
    ///
    /// Only an unbound record is ever mutated; every other outcome leaves the
    /// store untouched.
    pub fn validate(&self, key: &LicenseKey, device: &DeviceId) -> StoreResult<ValidationOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let bound: Option<Option<String>> = tx
            .query_row(
                "SELECT device_id FROM licenses WHERE license_key = ?1",
                params![key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match bound {
            None => ValidationOutcome::UnknownKey,
            Some(None) => {
                let changed = tx.execute(
                    "UPDATE licenses SET device_id = ?1 WHERE license_key = ?2 AND device_id IS NULL",
                    params![device.as_str(), key.as_str()],
                )?;
                if changed != 1 {
                    return Err(StoreError::InvalidData(format!(
                        "license {key} changed while locked"
                    )));
                }
                ValidationOutcome::Activated
            }
            Some(Some(existing)) if existing == device.as_str() => ValidationOutcome::AlreadyValid,
            Some(Some(_)) => ValidationOutcome::BoundElsewhere,
        };

        tx.commit()?;
        debug!("Validation of {} from {}: {:?}", key, device, outcome);
        Ok(outcome)
    }

    /// Looks up a single record.
    pub fn get(&self, key: &LicenseKey) -> StoreResult<Option<LicenseRecord>> {
        let conn = self.lock()?;
        let device: Option<Option<String>> = conn
            .query_row(
                "SELECT device_id FROM licenses WHERE license_key = ?1",
                params![key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        device
            .map(|device| {
                Ok(LicenseRecord {
                    license_key: key.clone(),
                    device_id: device.map(parse_device).transpose()?,
                })
            })
            .transpose()
    }

    /// Returns every record, ordered by key.
    pub fn list(&self) -> StoreResult<Vec<LicenseRecord>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT license_key, device_id FROM licenses ORDER BY license_key")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(key, device)| {
                Ok(LicenseRecord {
                    license_key: LicenseKey::new(key)
                        .map_err(|e| StoreError::InvalidData(e.to_string()))?,
                    device_id: device.map(parse_device).transpose()?,
                })
            })
            .collect()
    }

    /// Number of issued licenses.
    pub fn count(&self) -> StoreResult<usize> {
        let conn = self.lock()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM licenses", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

fn parse_device(raw: String) -> StoreResult<DeviceId> {
    DeviceId::new(raw).map_err(|e| StoreError::InvalidData(e.to_string()))
}
