//! License issuance and device-binding service for Market Journal.
//!
//! Issues opaque license keys and binds each one to the first device that
//! presents it. Exposed over a small JSON API:
//!
//! | Route | Method | Purpose |
//! |---|---|---|
//! | `/test` | GET | liveness |
//! | `/api/generate_license` | POST | mint a key (rate-limited) |
//! | `/api/validate_license` | POST | bind or check a key (rate-limited) |
//! | `/api/list_licenses` | GET | dump every record |
//!
//! Issuance and listing carry no caller authentication.

mod error;
pub mod rate_limit;
mod routes;
mod store;

use axum::{
    routing::{get, post},
    Router,
};
use marketjournal_types::api::{GENERATE_PATH, HEALTH_PATH, LIST_PATH, VALIDATE_PATH};
use std::future::Future;
use std::net::SocketAddr;

pub use error::{StoreError, StoreResult};
pub use routes::{AppState, DEFAULT_ISSUE_PER_MINUTE, DEFAULT_VALIDATE_PER_MINUTE};
pub use store::LicenseStore;

/// Build the HTTP API router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(routes::health))
        .route(GENERATE_PATH, post(routes::generate_license))
        .route(VALIDATE_PATH, post(routes::validate_license))
        .route(LIST_PATH, get(routes::list_licenses))
        .with_state(state)
}

/// Serve `router` on `listener`, exposing each peer's address to the handlers.
pub async fn serve(listener: tokio::net::TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

/// Like [`serve`], stopping once `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
    listener: tokio::net::TcpListener,
    router: Router,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
