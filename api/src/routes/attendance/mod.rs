use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post},
};
use util::state::AppState;

use crate::auth::guards::{require_student, require_teacher};

mod common;
mod delete;
mod get;
mod post;

pub use delete::delete_record;
pub use get::{daily_attendance, attendance_range, my_attendance};
pub use post::mark_attendance;

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/mark",
            post(mark_attendance).route_layer(from_fn(require_student)),
        )
        .route(
            "/daily",
            get(daily_attendance).route_layer(from_fn(require_teacher)),
        )
        .route(
            "/range",
            get(attendance_range).route_layer(from_fn(require_teacher)),
        )
        .route(
            "/my-attendance",
            get(my_attendance).route_layer(from_fn(require_student)),
        )
        .route(
            "/{record_id}",
            delete(delete_record).route_layer(from_fn(require_teacher)),
        )
}
