use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post, put},
};
use util::state::AppState;

use crate::auth::guards::{require_student, require_teacher};

mod common;
mod get;
mod post;
mod put;

pub use get::{code_history, list_active_codes};
pub use post::{cleanup_expired, generate_code, validate_code};
pub use put::deactivate_code;

pub fn qr_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/generate",
            post(generate_code).route_layer(from_fn(require_teacher)),
        )
        .route(
            "/active",
            get(list_active_codes).route_layer(from_fn(require_teacher)),
        )
        .route(
            "/validate",
            post(validate_code).route_layer(from_fn(require_student)),
        )
        .route(
            "/history",
            get(code_history).route_layer(from_fn(require_teacher)),
        )
        .route(
            "/{session_id}/deactivate",
            put(deactivate_code).route_layer(from_fn(require_teacher)),
        )
        .route(
            "/cleanup",
            post(cleanup_expired).route_layer(from_fn(require_teacher)),
        )
}
