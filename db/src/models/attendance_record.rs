use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One student marking one QR session.
///
/// Rows are append-only: created exactly once per successful marking
/// transaction, soft-deleted by the owning teacher, never hard-deleted and
/// never re-activated. A partial unique index on `(session_id, student_id)`
/// over non-deleted rows backs the at-most-once invariant.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub session_id: i64,
    pub student_id: i64,
    /// Owning teacher, denormalized from the session at creation time.
    pub teacher_id: i64,
    /// Computed once from the grace window when the record is created;
    /// never recomputed from the current time on read.
    pub status: Status,
    pub location: String,
    pub course: String,
    pub marked_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_by: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "late")]
    Late,
    /// Reserved for out-of-band teacher corrections; the marking transaction
    /// never assigns it.
    #[sea_orm(string_value = "absent")]
    Absent,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Present => "present",
            Status::Late => "late",
            Status::Absent => "absent",
        };
        f.write_str(s)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::qr_session::Entity",
        from = "Column::SessionId",
        to = "super::qr_session::Column::Id"
    )]
    Session,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
}

impl Related<super::qr_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}
