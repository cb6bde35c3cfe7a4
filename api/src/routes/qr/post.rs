use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::fail;
use services::qr_session::{CreateQrSession, DEFAULT_VALIDITY_MINUTES, QrSessionService};
use util::state::AppState;

use super::common::{CreateCodeReq, QrSessionResponse};

/// POST /api/qr/generate
///
/// Issues a fresh QR session for the authenticated teacher. The token in
/// `data.code` is what clients render as a QR image.
pub async fn generate_code(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(body): Json<CreateCodeReq>,
) -> (StatusCode, Json<ApiResponse<QrSessionResponse>>) {
    if let Err(e) = body.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error(e.to_string())),
        );
    }

    let params = CreateQrSession {
        generated_by: claims.sub,
        validity_minutes: body.validity_minutes.unwrap_or(DEFAULT_VALIDITY_MINUTES),
        description: body.description,
        location: body.location,
        course: body.course,
    };

    match QrSessionService::generate(state.db(), params, Utc::now()).await {
        Ok(session) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                session.into(),
                "QR code generated successfully",
            )),
        ),
        Err(e) => fail(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidateCodeReq {
    pub code: String,
}

/// POST /api/qr/validate
///
/// Resolves a scanned code for a student without marking attendance; used by
/// the scanner UI to show session details before confirming.
pub async fn validate_code(
    State(state): State<AppState>,
    Extension(AuthUser(_claims)): Extension<AuthUser>,
    Json(body): Json<ValidateCodeReq>,
) -> (StatusCode, Json<ApiResponse<QrSessionResponse>>) {
    if body.code.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Please provide a QR code")),
        );
    }

    match QrSessionService::validate_code(state.db(), body.code.trim(), Utc::now()).await {
        Ok(session) => (
            StatusCode::OK,
            Json(ApiResponse::success(session.into(), "QR code is valid")),
        ),
        Err(e) => fail(e),
    }
}

#[derive(Debug, Serialize, Default)]
pub struct CleanupResponse {
    pub deactivated: u64,
}

/// POST /api/qr/cleanup
///
/// Advisory maintenance hook that flips `active` off for expired sessions.
/// Validity never depends on this having run.
pub async fn cleanup_expired(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<CleanupResponse>>) {
    match QrSessionService::sweep_expired(state.db(), Utc::now()).await {
        Ok(deactivated) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                CleanupResponse { deactivated },
                "Expired QR codes cleaned up",
            )),
        ),
        Err(e) => fail(e),
    }
}
