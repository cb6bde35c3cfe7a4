use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::fail;
use services::attendance::AttendanceService;
use util::state::AppState;

use super::common::{AttendanceListResponse, AttendanceRecordResponse, DailyAttendanceResponse};

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub date: Option<NaiveDate>,
}

/// GET /api/attendance/daily
///
/// One day of the requesting teacher's ledger plus status counts.
/// Defaults to today when `date` is omitted.
pub async fn daily_attendance(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(query): Query<DailyQuery>,
) -> (StatusCode, Json<ApiResponse<DailyAttendanceResponse>>) {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    match AttendanceService::daily(state.db(), claims.sub, date).await {
        Ok((records, stats)) => {
            let data = DailyAttendanceResponse {
                date: date.to_string(),
                records: records
                    .into_iter()
                    .map(AttendanceRecordResponse::from)
                    .collect(),
                stats,
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(data, "Daily attendance fetched")),
            )
        }
        Err(e) => fail(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub student_id: Option<i64>,
}

/// GET /api/attendance/range
///
/// The requesting teacher's records across an inclusive date range,
/// optionally narrowed to one student. Both bounds are required.
pub async fn attendance_range(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(query): Query<RangeQuery>,
) -> (StatusCode, Json<ApiResponse<AttendanceListResponse>>) {
    let (Some(start), Some(end)) = (query.start_date, query.end_date) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                "Please provide both start_date and end_date",
            )),
        );
    };

    if end < start {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("end_date must not precede start_date")),
        );
    }

    match AttendanceService::range(state.db(), claims.sub, start, end, query.student_id).await {
        Ok(records) => {
            let data = AttendanceListResponse {
                count: records.len(),
                records: records
                    .into_iter()
                    .map(AttendanceRecordResponse::from)
                    .collect(),
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(data, "Attendance records fetched")),
            )
        }
        Err(e) => fail(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct MyAttendanceQuery {
    pub days: Option<i64>,
}

/// GET /api/attendance/my-attendance
///
/// The requesting student's own records, newest first. Defaults to the
/// last 30 days.
pub async fn my_attendance(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(query): Query<MyAttendanceQuery>,
) -> (StatusCode, Json<ApiResponse<AttendanceListResponse>>) {
    let days = query.days.unwrap_or(30).clamp(1, 365);
    let now = Utc::now();

    match AttendanceService::student_history(state.db(), claims.sub, now - Duration::days(days), now)
        .await
    {
        Ok(records) => {
            let data = AttendanceListResponse {
                count: records.len(),
                records: records
                    .into_iter()
                    .map(AttendanceRecordResponse::from)
                    .collect(),
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(data, "Attendance history fetched")),
            )
        }
        Err(e) => fail(e),
    }
}
