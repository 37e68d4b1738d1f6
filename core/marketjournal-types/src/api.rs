//! JSON bodies exchanged over the license service's HTTP API.

use crate::ids::LicenseKey;
use crate::record::{LicenseRecord, ValidationOutcome};
use serde::{Deserialize, Serialize};

/// Liveness route.
pub const HEALTH_PATH: &str = "/test";
/// Issuance route.
pub const GENERATE_PATH: &str = "/api/generate_license";
/// Validation and binding route.
pub const VALIDATE_PATH: &str = "/api/validate_license";
/// Administrative listing route.
pub const LIST_PATH: &str = "/api/list_licenses";

/// Message returned when a validate request lacks a field.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing license key or device ID";

/// Body of `GET /test`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}

/// Body of a successful `POST /api/generate_license`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub license_key: LicenseKey,
}

/// Body of `POST /api/validate_license`.
///
/// Both fields are optional at the serde level so that a missing field is
/// reported as a 400 with a message rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub license_key: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

impl ValidateRequest {
    /// Builds a complete request.
    #[must_use]
    pub fn new(license_key: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            license_key: Some(license_key.into()),
            device_id: Some(device_id.into()),
        }
    }
}

/// Reply to a validate request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub message: String,
    /// Machine-readable outcome. Absent on request errors and from older servers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ValidationOutcome>,
}

impl ValidateResponse {
    /// A reply describing a decided outcome.
    #[must_use]
    pub fn from_outcome(outcome: ValidationOutcome) -> Self {
        Self {
            valid: outcome.is_valid(),
            message: outcome.message().to_string(),
            status: Some(outcome),
        }
    }

    /// A rejection that carries no outcome (bad request, rate limited).
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            status: None,
        }
    }
}

/// Body of `GET /api/list_licenses`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    pub licenses: Vec<LicenseRecord>,
}

/// Generic error body for non-validate routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
