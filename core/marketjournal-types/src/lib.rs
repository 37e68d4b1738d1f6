//! Core type definitions for Market Journal licensing.
//!
//! This crate defines the types shared by the license service and the
//! activation client:
//! - License key and device identifiers
//! - The persisted license record and validation outcomes
//! - JSON bodies for every HTTP endpoint

pub mod api;
mod ids;
mod record;

pub use api::{
    ErrorResponse, GenerateResponse, HealthResponse, ListResponse, ValidateRequest,
    ValidateResponse,
};
pub use ids::{DeviceId, LicenseKey};
pub use record::{LicenseRecord, ValidationOutcome};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur constructing core types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} must not be empty")]
    Empty(&'static str),
}
