//! The marking transaction and the read-only reporting queries over the
//! attendance ledger.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use db::models::attendance_record::{ActiveModel, Column, Entity, Model, Status};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;

use crate::qr_session::QrSessionService;
use crate::service::{unique_violation_on, AppError};

pub use db::models::attendance_record::Model as AttendanceRecord;

/// Minutes after session creation during which marking still counts as
/// `present`. The boundary is exclusive in favor of `late`: marking at
/// exactly creation + 5:00 is late.
pub const GRACE_MINUTES: i64 = 5;

/// Status counts for one teacher-day of the ledger.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DailyStats {
    pub present: i64,
    pub late: i64,
    pub absent: i64,
    pub total: i64,
}

pub struct AttendanceService;

impl AttendanceService {
    /// The marking transaction: validated, at-most-once per (student, session).
    ///
    /// Steps 1-3 are pure validation and mutate nothing; the single write
    /// happens at step 5. `now` is sourced once by the caller and used for
    /// both the validity check and the grace-window classification. The
    /// duplicate pre-check is a fast path only: the partial unique index on
    /// `(session_id, student_id)` catches concurrent marks, and that
    /// violation is translated to `AlreadyMarked` rather than surfaced raw.
    pub async fn mark(
        db: &DatabaseConnection,
        student_id: i64,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Model, AppError> {
        let session = QrSessionService::validate_code(db, code, now).await?;

        if Entity::find()
            .filter(Column::SessionId.eq(session.id))
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::IsDeleted.eq(false))
            .one(db)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyMarked);
        }

        let status = if now < session.created_at + Duration::minutes(GRACE_MINUTES) {
            Status::Present
        } else {
            Status::Late
        };

        let insert = ActiveModel {
            session_id: Set(session.id),
            student_id: Set(student_id),
            teacher_id: Set(session.generated_by),
            status: Set(status),
            location: Set(session.location.clone()),
            course: Set(session.course.clone()),
            marked_at: Set(now),
            is_deleted: Set(false),
            deleted_by: Set(None),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await;

        match insert {
            Ok(record) => Ok(record),
            // Concurrent mark won the insert; same outcome for the caller.
            Err(e) if unique_violation_on(&e, "attendance_records") => {
                Err(AppError::AlreadyMarked)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// One teacher-day of records (chronological) plus status counts.
    pub async fn daily(
        db: &DatabaseConnection,
        teacher_id: i64,
        date: NaiveDate,
    ) -> Result<(Vec<Model>, DailyStats), AppError> {
        let (start, end) = day_bounds(date);

        let records = Entity::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .filter(Column::IsDeleted.eq(false))
            .filter(Column::MarkedAt.gte(start))
            .filter(Column::MarkedAt.lt(end))
            .order_by_asc(Column::MarkedAt)
            .all(db)
            .await?;

        let counts: Vec<(Status, i64)> = Entity::find()
            .select_only()
            .column(Column::Status)
            .column_as(Column::Id.count(), "count")
            .filter(Column::TeacherId.eq(teacher_id))
            .filter(Column::IsDeleted.eq(false))
            .filter(Column::MarkedAt.gte(start))
            .filter(Column::MarkedAt.lt(end))
            .group_by(Column::Status)
            .into_tuple()
            .all(db)
            .await?;

        let mut stats = DailyStats::default();
        for (status, count) in counts {
            match status {
                Status::Present => stats.present = count,
                Status::Late => stats.late = count,
                Status::Absent => stats.absent = count,
            }
            stats.total += count;
        }

        Ok((records, stats))
    }

    /// A teacher's records across a date range, optionally for one student.
    pub async fn range(
        db: &DatabaseConnection,
        teacher_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        student_id: Option<i64>,
    ) -> Result<Vec<Model>, AppError> {
        let (range_start, _) = day_bounds(start);
        let (_, range_end) = day_bounds(end);

        let mut query = Entity::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .filter(Column::IsDeleted.eq(false))
            .filter(Column::MarkedAt.gte(range_start))
            .filter(Column::MarkedAt.lt(range_end))
            .order_by_desc(Column::MarkedAt);

        if let Some(student_id) = student_id {
            query = query.filter(Column::StudentId.eq(student_id));
        }

        Ok(query.all(db).await?)
    }

    /// A student's own history within a timestamp range, newest first.
    pub async fn student_history(
        db: &DatabaseConnection,
        student_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Model>, AppError> {
        Ok(Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::IsDeleted.eq(false))
            .filter(Column::MarkedAt.gte(start))
            .filter(Column::MarkedAt.lte(end))
            .order_by_desc(Column::MarkedAt)
            .all(db)
            .await?)
    }

    /// Soft delete by the owning teacher. The row stays for audit history
    /// and is never resurrected; the student may be marked again afterwards
    /// since the at-most-once invariant covers non-deleted rows only.
    pub async fn soft_delete(
        db: &DatabaseConnection,
        teacher_id: i64,
        record_id: i64,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let Some(record) = Entity::find()
            .filter(Column::Id.eq(record_id))
            .filter(Column::TeacherId.eq(teacher_id))
            .filter(Column::IsDeleted.eq(false))
            .one(db)
            .await?
        else {
            return Err(AppError::NotFound("Attendance record"));
        };

        let mut active: ActiveModel = record.into();
        active.is_deleted = Set(true);
        active.deleted_by = Set(Some(teacher_id));
        active.deleted_at = Set(Some(now));
        active.update(db).await?;
        Ok(())
    }
}

fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    (start, start + Duration::days(1))
}
