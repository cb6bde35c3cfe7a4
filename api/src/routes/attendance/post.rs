use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::fail;
use services::attendance::AttendanceService;
use util::state::AppState;

use super::common::AttendanceRecordResponse;

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceReq {
    pub code: String,
}

/// POST /api/attendance/mark
///
/// The marking transaction: turns a scanned code plus the authenticated
/// student identity into an attendance record, at most once per session.
pub async fn mark_attendance(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(body): Json<MarkAttendanceReq>,
) -> (StatusCode, Json<ApiResponse<AttendanceRecordResponse>>) {
    if body.code.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Please provide a QR code")),
        );
    }

    match AttendanceService::mark(state.db(), claims.sub, body.code.trim(), Utc::now()).await {
        Ok(record) => {
            let message = format!("Attendance marked successfully as {}", record.status);
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(record.into(), message)),
            )
        }
        Err(e) => fail(e),
    }
}
