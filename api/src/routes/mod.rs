//! HTTP route entry point for `/api/...`.
//!
//! Route groups include:
//! - `/health` → Health check endpoint (public)
//! - `/auth` → Registration and login (public)
//! - `/qr` → QR session lifecycle (teacher-only except validation)
//! - `/attendance` → Marking transaction and reporting

use axum::Router;
use util::state::AppState;

pub mod attendance;
pub mod auth;
pub mod common;
pub mod health;
pub mod qr;

/// Builds the complete application router for all HTTP endpoints.
///
/// The returned router has its state applied and mounts all core API routes
/// under their respective base paths.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health::health_routes())
        .nest("/auth", auth::auth_routes())
        .nest("/qr", qr::qr_routes())
        .nest("/attendance", attendance::attendance_routes())
        .with_state(app_state)
}
