//! HTTP handlers for the license service.

use crate::error::StoreError;
use crate::rate_limit::{Quota, RateLimitPolicy, RateLimited, TokenBucketLimiter};
use crate::store::LicenseStore;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use marketjournal_types::{
    api::MISSING_FIELDS_MESSAGE, DeviceId, ErrorResponse, GenerateResponse, HealthResponse,
    LicenseKey, ListResponse, ValidateRequest, ValidateResponse, ValidationOutcome,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Issuance quota per caller.
pub const DEFAULT_ISSUE_PER_MINUTE: u32 = 5;
/// Validation quota per caller.
pub const DEFAULT_VALIDATE_PER_MINUTE: u32 = 10;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LicenseStore>,
    pub issue_limit: Arc<dyn RateLimitPolicy>,
    pub validate_limit: Arc<dyn RateLimitPolicy>,
}

impl AppState {
    /// State with the default per-caller quotas.
    pub fn new(store: Arc<LicenseStore>) -> Self {
        Self::with_limits(
            store,
            Arc::new(TokenBucketLimiter::new(Quota::per_minute(
                DEFAULT_ISSUE_PER_MINUTE,
            ))),
            Arc::new(TokenBucketLimiter::new(Quota::per_minute(
                DEFAULT_VALIDATE_PER_MINUTE,
            ))),
        )
    }

    pub fn with_limits(
        store: Arc<LicenseStore>,
        issue_limit: Arc<dyn RateLimitPolicy>,
        validate_limit: Arc<dyn RateLimitPolicy>,
    ) -> Self {
        Self {
            store,
            issue_limit,
            validate_limit,
        }
    }
}

/// Failures that end a request before a normal reply is produced.
pub(crate) enum ApiError {
    RateLimited(RateLimited),
    Store(StoreError),
    Task(tokio::task::JoinError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::RateLimited(limited) => with_retry_after(
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorResponse {
                        error: "rate limit exceeded".to_string(),
                    }),
                )
                    .into_response(),
                limited,
            ),
            Self::Store(e) => {
                error!("License store failure: {}", e);
                internal_error()
            }
            Self::Task(e) => {
                error!("License store task failed: {}", e);
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal error".to_string(),
        }),
    )
        .into_response()
}

fn with_retry_after(mut response: Response, limited: RateLimited) -> Response {
    if let Ok(value) = HeaderValue::from_str(&limited.retry_after_secs().to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}

/// Callers are keyed by peer IP so reconnecting on a new port does not reset a bucket.
fn caller_key(addr: &SocketAddr) -> String {
    addr.ip().to_string()
}

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Server is working".to_string(),
    })
}

pub(crate) async fn generate_license(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<(StatusCode, Json<GenerateResponse>), ApiError> {
    if let Err(limited) = state.issue_limit.check(&caller_key(&addr)) {
        warn!("Issuance rate limit hit by {}", addr.ip());
        return Err(ApiError::RateLimited(limited));
    }

    let store = Arc::clone(&state.store);
    let license_key = tokio::task::spawn_blocking(move || store.issue()).await??;
    Ok((StatusCode::CREATED, Json(GenerateResponse { license_key })))
}

pub(crate) async fn validate_license(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Response {
    if let Err(limited) = state.validate_limit.check(&caller_key(&addr)) {
        warn!("Validation rate limit hit by {}", addr.ip());
        return with_retry_after(
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ValidateResponse::rejected("Rate limit exceeded")),
            )
                .into_response(),
            limited,
        );
    }

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Malformed validation request: {}", rejection.body_text());
            ValidateRequest::default()
        }
    };

    let license_key = request.license_key.and_then(|k| LicenseKey::new(k).ok());
    let device_id = request.device_id.and_then(|d| DeviceId::new(d).ok());
    let (Some(license_key), Some(device_id)) = (license_key, device_id) else {
        warn!("Missing license key or device ID");
        return (
            StatusCode::BAD_REQUEST,
            Json(ValidateResponse::rejected(MISSING_FIELDS_MESSAGE)),
        )
            .into_response();
    };

    info!("Validating license: {} for device: {}", license_key, device_id);

    let store = Arc::clone(&state.store);
    let (key, device) = (license_key.clone(), device_id.clone());
    let outcome = match tokio::task::spawn_blocking(move || store.validate(&key, &device)).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => return ApiError::Store(e).into_response(),
        Err(e) => return ApiError::Task(e).into_response(),
    };

    match outcome {
        ValidationOutcome::Activated => {
            info!("License key activated: {} for device: {}", license_key, device_id)
        }
        ValidationOutcome::AlreadyValid => {
            info!("Valid license key used: {} for device: {}", license_key, device_id)
        }
        ValidationOutcome::UnknownKey => {
            warn!("Invalid license key attempt: {}", license_key)
        }
        ValidationOutcome::BoundElsewhere => {
            warn!("License key reuse attempt: {} for device: {}", license_key, device_id)
        }
    }

    (StatusCode::OK, Json(ValidateResponse::from_outcome(outcome))).into_response()
}

pub(crate) async fn list_licenses(
    State(state): State<AppState>,
) -> Result<Json<ListResponse>, ApiError> {
    let store = Arc::clone(&state.store);
    let licenses = tokio::task::spawn_blocking(move || store.list()).await??;
    Ok(Json(ListResponse { licenses }))
}
