use serde::{Deserialize, Serialize};
use validator::Validate;

use db::models::qr_session::Model as QrSessionModel;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCodeReq {
    pub description: Option<String>,
    pub location: Option<String>,
    pub course: Option<String>,
    #[validate(range(min = 1, max = 720))]
    pub validity_minutes: Option<i64>,
}

#[derive(Debug, Serialize, Default)]
pub struct QrSessionResponse {
    pub id: i64,
    pub code: String,
    pub generated_by: i64,
    pub description: String,
    pub location: String,
    pub course: String,
    pub active: bool,
    pub created_at: String,
    pub expires_at: String,
    pub validity_minutes: i64,
}

impl From<QrSessionModel> for QrSessionResponse {
    fn from(m: QrSessionModel) -> Self {
        Self {
            id: m.id,
            code: m.code,
            generated_by: m.generated_by,
            description: m.description,
            location: m.location,
            course: m.course,
            active: m.active,
            created_at: m.created_at.to_rfc3339(),
            expires_at: m.expires_at.to_rfc3339(),
            validity_minutes: (m.expires_at - m.created_at).num_minutes(),
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub per_page: u64,
}

#[derive(Debug, Serialize, Default)]
pub struct HistoryResponse {
    pub sessions: Vec<QrSessionResponse>,
    pub pagination: Pagination,
}
