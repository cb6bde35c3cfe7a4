use crate::response::ApiResponse;
use axum::{Json, http::StatusCode};
use serde::Serialize;
use services::AppError;

/// Maps a core error to its HTTP status.
pub fn error_status(err: &AppError) -> StatusCode {
    match err {
        AppError::InvalidCode | AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::CodeExpired | AppError::AlreadyMarked => StatusCode::BAD_REQUEST,
        AppError::NotOwner => StatusCode::FORBIDDEN,
        AppError::GenerationExhausted(_) | AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turns a core error into the standard error envelope.
///
/// Business-rule outcomes (invalid/expired/already-marked) are expected and
/// not logged; operational failures are.
pub fn fail<T>(err: AppError) -> (StatusCode, Json<ApiResponse<T>>)
where
    T: Serialize + Default,
{
    if matches!(err, AppError::Db(_) | AppError::GenerationExhausted(_)) {
        tracing::error!(error = %err, "attendance core operation failed");
    }
    (error_status(&err), Json(ApiResponse::error(err.to_string())))
}
