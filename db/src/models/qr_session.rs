use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

/// One issued QR code: its token, owner and validity window.
///
/// `code` is unique among every session ever created (not just active ones),
/// enforced by the database; an expired code can never be re-issued and
/// replayed by a student who saved it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "qr_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short random token encoded into the QR image by clients.
    #[sea_orm(unique)]
    pub code: String,
    /// Owning teacher; only they may deactivate or query this session.
    pub generated_by: i64,
    pub description: String,
    pub location: String,
    pub course: String,
    /// One-way flag: flipped to false by deactivation or the expiry sweep,
    /// never back.
    pub active: bool,
    /// Generation instant; also anchors the present/late grace window.
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::GeneratedBy",
        to = "super::user::Column::Id"
    )]
    Teacher,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    Records,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Pure validity predicate: active and not yet expired.
    ///
    /// Evaluated fresh at each use against the supplied clock; never cached,
    /// and never dependent on the expiry sweep having run. The boundary at
    /// exactly `expires_at` is exclusive.
    #[inline]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.active && now < self.expires_at
    }
}
