use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::auth::AuthUser;
use crate::auth::guards::Empty;
use crate::response::ApiResponse;
use crate::routes::common::fail;
use services::attendance::AttendanceService;
use util::state::AppState;

/// DELETE /api/attendance/{record_id}
///
/// Soft delete by the owning teacher. The row survives for audit history.
pub async fn delete_record(
    State(state): State<AppState>,
    Path(record_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> (StatusCode, Json<ApiResponse<Empty>>) {
    match AttendanceService::soft_delete(state.db(), claims.sub, record_id, Utc::now()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                Empty,
                "Attendance record deleted successfully",
            )),
        ),
        Err(e) => fail(e),
    }
}
