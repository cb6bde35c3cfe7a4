use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::fail;
use services::qr_session::QrSessionService;
use util::state::AppState;

use super::common::QrSessionResponse;

/// PUT /api/qr/{session_id}/deactivate
///
/// One-way, owner-only deactivation. Calling it on an already-inactive
/// session succeeds with no state change.
pub async fn deactivate_code(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> (StatusCode, Json<ApiResponse<QrSessionResponse>>) {
    match QrSessionService::deactivate(state.db(), claims.sub, session_id, Utc::now()).await {
        Ok(session) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                session.into(),
                "QR code deactivated successfully",
            )),
        ),
        Err(e) => fail(e),
    }
}
