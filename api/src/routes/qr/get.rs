use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::fail;
use services::qr_session::QrSessionService;
use util::state::AppState;

use super::common::{HistoryResponse, Pagination, QrSessionResponse};

/// GET /api/qr/active
///
/// The requesting teacher's currently-live sessions.
pub async fn list_active_codes(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> (StatusCode, Json<ApiResponse<Vec<QrSessionResponse>>>) {
    match QrSessionService::active_sessions(state.db(), claims.sub, Utc::now()).await {
        Ok(sessions) => {
            let data: Vec<QrSessionResponse> =
                sessions.into_iter().map(QrSessionResponse::from).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(data, "Active QR codes fetched")),
            )
        }
        Err(e) => fail(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub date: Option<NaiveDate>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// GET /api/qr/history
///
/// The requesting teacher's generation history, newest first, optionally
/// limited to one calendar day.
pub async fn code_history(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> (StatusCode, Json<ApiResponse<HistoryResponse>>) {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);

    match QrSessionService::history(state.db(), claims.sub, query.date, page, per_page).await {
        Ok((sessions, total)) => {
            let data = HistoryResponse {
                sessions: sessions.into_iter().map(QrSessionResponse::from).collect(),
                pagination: Pagination {
                    current_page: page,
                    total_pages: total.div_ceil(per_page),
                    total_items: total,
                    per_page,
                },
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(data, "QR code history fetched")),
            )
        }
        Err(e) => fail(e),
    }
}
