//! Shared fixtures for activation tests.

#![allow(dead_code)]

use async_trait::async_trait;
use marketjournal_license::{
    CredentialStore, LicenseError, LicenseResult, LicenseService, Notice, Prompt,
};
use marketjournal_types::{DeviceId, LicenseKey, ValidateResponse, ValidationOutcome};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

/// Answers prompts from a fixed script and records what it was told.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<Option<String>>,
    pub asked: Vec<(u32, u32)>,
    pub notices: Vec<Notice>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| a.map(Into::into)).collect(),
            ..Self::default()
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask_license_key(
        &mut self,
        attempt: u32,
        max_attempts: u32,
    ) -> LicenseResult<Option<String>> {
        self.asked.push((attempt, max_attempts));
        Ok(self.answers.pop_front().flatten())
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// How the mock answers validate calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Down,
    ValidateUnreachable,
    RateLimited,
}

/// In-memory license service with real binding rules.
#[derive(Debug)]
pub struct MockService {
    mode: Mode,
    licenses: Mutex<HashMap<String, Option<String>>>,
    pub pings: AtomicUsize,
    pub validations: AtomicUsize,
}

impl MockService {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            licenses: Mutex::new(HashMap::new()),
            pings: AtomicUsize::new(0),
            validations: AtomicUsize::new(0),
        }
    }

    pub fn with_key(self, key: &str, bound_to: Option<&str>) -> Self {
        self.licenses
            .lock()
            .unwrap()
            .insert(key.to_string(), bound_to.map(String::from));
        self
    }

    pub fn bound_device(&self, key: &str) -> Option<String> {
        self.licenses.lock().unwrap().get(key).cloned().flatten()
    }

    pub fn validation_count(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LicenseService for MockService {
    async fn ping(&self) -> LicenseResult<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        if self.mode == Mode::Down {
            return Err(LicenseError::ServerUnreachable("connection refused".into()));
        }
        Ok(())
    }

    async fn validate(
        &self,
        key: &LicenseKey,
        device: &DeviceId,
    ) -> LicenseResult<ValidateResponse> {
        self.validations.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            Mode::ValidateUnreachable | Mode::Down => {
                return Err(LicenseError::ServerUnreachable("timed out".into()));
            }
            Mode::RateLimited => {
                return Err(LicenseError::RateLimited {
                    retry_after_secs: Some(6),
                });
            }
            Mode::Normal => {}
        }

        let mut licenses = self.licenses.lock().unwrap();
        let outcome = match licenses.get_mut(key.as_str()) {
            None => ValidationOutcome::UnknownKey,
            Some(slot) => match slot {
                None => {
                    *slot = Some(device.as_str().to_string());
                    ValidationOutcome::Activated
                }
                Some(bound) if bound.as_str() == device.as_str() => ValidationOutcome::AlreadyValid,
                Some(_) => ValidationOutcome::BoundElsewhere,
            },
        };
        Ok(ValidateResponse::from_outcome(outcome))
    }
}

/// A credential store inside a fresh temporary directory.
pub fn temp_credentials() -> (TempDir, CredentialStore) {
    let dir = TempDir::new().unwrap();
    let store = CredentialStore::new(
        dir.path().join("license_key"),
        dir.path().join("encryption_key"),
    );
    (dir, store)
}

pub fn device(id: &str) -> DeviceId {
    DeviceId::new(id).unwrap()
}

pub fn key(raw: &str) -> LicenseKey {
    LicenseKey::new(raw).unwrap()
}
