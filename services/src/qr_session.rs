//! QR session lifecycle: generation, validation, deactivation and the
//! advisory expiry sweep.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use db::models::qr_session::{ActiveModel, Column, Entity, Model};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::code::{random_code, MAX_GENERATION_ATTEMPTS};
use crate::service::{unique_violation_on, AppError};

pub use db::models::qr_session::Model as QrSession;

pub const DEFAULT_VALIDITY_MINUTES: i64 = 10;
pub const DEFAULT_DESCRIPTION: &str = "Daily attendance QR code";
pub const DEFAULT_LOCATION: &str = "Classroom";
pub const DEFAULT_COURSE: &str = "General";

#[derive(Debug, Clone)]
pub struct CreateQrSession {
    pub generated_by: i64,
    pub validity_minutes: i64,
    pub description: Option<String>,
    pub location: Option<String>,
    pub course: Option<String>,
}

pub struct QrSessionService;

impl QrSessionService {
    /// Generates a session with a code unique across every session ever
    /// created, expired and deactivated ones included.
    ///
    /// The lookup before each insert is only a fast path; the database unique
    /// constraint on `code` is the authoritative guard. A constraint violation
    /// at insert time means a concurrent caller won the same draw, so the
    /// attempt is consumed and the code redrawn.
    pub async fn generate(
        db: &DatabaseConnection,
        params: CreateQrSession,
        now: DateTime<Utc>,
    ) -> Result<Model, AppError> {
        let expires_at = now + Duration::minutes(params.validity_minutes);

        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let code = random_code();

            if Entity::find()
                .filter(Column::Code.eq(code.as_str()))
                .one(db)
                .await?
                .is_some()
            {
                continue;
            }

            let insert = ActiveModel {
                code: Set(code),
                generated_by: Set(params.generated_by),
                description: Set(params
                    .description
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_owned())),
                location: Set(params
                    .location
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LOCATION.to_owned())),
                course: Set(params
                    .course
                    .clone()
                    .unwrap_or_else(|| DEFAULT_COURSE.to_owned())),
                active: Set(true),
                created_at: Set(now),
                expires_at: Set(expires_at),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await;

            match insert {
                Ok(session) => return Ok(session),
                // Lost the generation race; redraw.
                Err(e) if unique_violation_on(&e, "qr_sessions.code") => continue,
                Err(e) => return Err(e.into()),
            }
        }

        tracing::error!(
            attempts = MAX_GENERATION_ATTEMPTS,
            "exhausted attempts to generate a unique QR code"
        );
        Err(AppError::GenerationExhausted(MAX_GENERATION_ATTEMPTS))
    }

    /// Resolves a scanned code and checks the validity predicate.
    pub async fn validate_code(
        db: &DatabaseConnection,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Model, AppError> {
        let Some(session) = Entity::find()
            .filter(Column::Code.eq(code))
            .one(db)
            .await?
        else {
            return Err(AppError::InvalidCode);
        };

        if !session.is_valid(now) {
            return Err(AppError::CodeExpired);
        }

        Ok(session)
    }

    /// One-way deactivation, restricted to the owning teacher.
    ///
    /// Idempotent: deactivating an already-inactive session is a no-op
    /// success, not an error.
    pub async fn deactivate(
        db: &DatabaseConnection,
        actor: i64,
        session_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Model, AppError> {
        let Some(session) = Entity::find_by_id(session_id).one(db).await? else {
            return Err(AppError::NotFound("QR session"));
        };

        if session.generated_by != actor {
            return Err(AppError::NotOwner);
        }

        if !session.active {
            return Ok(session);
        }

        let mut active: ActiveModel = session.into();
        active.active = Set(false);
        active.updated_at = Set(now);
        Ok(active.update(db).await?)
    }

    /// Flips `active` off for every session past its expiry.
    ///
    /// Advisory housekeeping only: `is_valid` checks `expires_at` directly
    /// and never relies on this sweep having run.
    pub async fn sweep_expired(
        db: &DatabaseConnection,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let res = Entity::update_many()
            .col_expr(Column::Active, Expr::value(false))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Active.eq(true))
            .filter(Column::ExpiresAt.lte(now))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }

    /// The teacher's currently-live sessions.
    pub async fn active_sessions(
        db: &DatabaseConnection,
        teacher_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Model>, AppError> {
        Ok(Entity::find()
            .filter(Column::GeneratedBy.eq(teacher_id))
            .filter(Column::Active.eq(true))
            .filter(Column::ExpiresAt.gt(now))
            .order_by_desc(Column::CreatedAt)
            .all(db)
            .await?)
    }

    /// The teacher's generation history, newest first, optionally limited to
    /// one calendar day. Returns the page plus the total row count.
    pub async fn history(
        db: &DatabaseConnection,
        teacher_id: i64,
        date: Option<NaiveDate>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Model>, u64), AppError> {
        let mut query = Entity::find()
            .filter(Column::GeneratedBy.eq(teacher_id))
            .order_by_desc(Column::CreatedAt);

        if let Some(date) = date {
            let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
            let end = start + Duration::days(1);
            query = query
                .filter(Column::CreatedAt.gte(start))
                .filter(Column::CreatedAt.lt(end));
        }

        let paginator = query.paginate(db, per_page.max(1));
        let total = paginator.num_items().await?;
        let sessions = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((sessions, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use db::models::user::{Model as UserModel, Role};
    use db::test_utils::setup_test_db;

    async fn teacher(db: &DatabaseConnection, name: &str) -> UserModel {
        UserModel::create(db, name, &format!("{name}@test.com"), "password", Role::Teacher)
            .await
            .expect("create teacher")
    }

    fn params(teacher_id: i64, validity_minutes: i64) -> CreateQrSession {
        CreateQrSession {
            generated_by: teacher_id,
            validity_minutes,
            description: None,
            location: None,
            course: None,
        }
    }

    #[tokio::test]
    async fn generate_applies_defaults_and_validity_window() {
        let db = setup_test_db().await;
        let t = teacher(&db, "gen_lect").await;
        let now = Utc.with_ymd_and_hms(2026, 8, 28, 9, 0, 0).unwrap();

        let s = QrSessionService::generate(&db, params(t.id, 10), now)
            .await
            .unwrap();

        assert_eq!(s.code.len(), crate::code::CODE_LENGTH);
        assert!(s.active);
        assert_eq!(s.description, DEFAULT_DESCRIPTION);
        assert_eq!(s.location, DEFAULT_LOCATION);
        assert_eq!(s.course, DEFAULT_COURSE);
        assert_eq!(s.created_at, now);
        assert_eq!(s.expires_at, now + Duration::minutes(10));
    }

    #[tokio::test]
    async fn generated_codes_are_distinct() {
        let db = setup_test_db().await;
        let t = teacher(&db, "gen_many").await;
        let now = Utc::now();

        let mut codes = std::collections::HashSet::new();
        for _ in 0..20 {
            let s = QrSessionService::generate(&db, params(t.id, 10), now)
                .await
                .unwrap();
            assert!(codes.insert(s.code), "code issued twice");
        }
    }

    #[tokio::test]
    async fn duplicate_code_insert_hits_unique_constraint() {
        let db = setup_test_db().await;
        let t = teacher(&db, "dup_code").await;
        let now = Utc::now();

        let seed = |code: &str| ActiveModel {
            code: Set(code.to_owned()),
            generated_by: Set(t.id),
            description: Set(DEFAULT_DESCRIPTION.to_owned()),
            location: Set(DEFAULT_LOCATION.to_owned()),
            course: Set(DEFAULT_COURSE.to_owned()),
            active: Set(true),
            created_at: Set(now),
            expires_at: Set(now + Duration::minutes(10)),
            updated_at: Set(now),
            ..Default::default()
        };

        seed("SAMECODE").insert(&db).await.unwrap();
        let err = seed("SAMECODE").insert(&db).await.unwrap_err();
        assert!(unique_violation_on(&err, "qr_sessions.code"));
    }

    #[tokio::test]
    async fn validate_code_distinguishes_unknown_expired_and_inactive() {
        let db = setup_test_db().await;
        let t = teacher(&db, "val_lect").await;
        let t0 = Utc.with_ymd_and_hms(2026, 8, 28, 9, 0, 0).unwrap();

        let s = QrSessionService::generate(&db, params(t.id, 10), t0)
            .await
            .unwrap();

        assert!(matches!(
            QrSessionService::validate_code(&db, "NOPE0000", t0).await,
            Err(AppError::InvalidCode)
        ));

        // valid at T+9:59, expired at exactly T+10:00
        let ok = QrSessionService::validate_code(
            &db,
            &s.code,
            t0 + Duration::minutes(9) + Duration::seconds(59),
        )
        .await
        .unwrap();
        assert_eq!(ok.id, s.id);

        assert!(matches!(
            QrSessionService::validate_code(&db, &s.code, t0 + Duration::minutes(10)).await,
            Err(AppError::CodeExpired)
        ));

        // deactivated sessions fail the same predicate
        QrSessionService::deactivate(&db, t.id, s.id, t0).await.unwrap();
        assert!(matches!(
            QrSessionService::validate_code(&db, &s.code, t0 + Duration::minutes(1)).await,
            Err(AppError::CodeExpired)
        ));
    }

    #[tokio::test]
    async fn deactivate_is_owner_only_and_idempotent() {
        let db = setup_test_db().await;
        let owner = teacher(&db, "deact_owner").await;
        let other = teacher(&db, "deact_other").await;
        let now = Utc::now();

        let s = QrSessionService::generate(&db, params(owner.id, 10), now)
            .await
            .unwrap();

        assert!(matches!(
            QrSessionService::deactivate(&db, other.id, s.id, now).await,
            Err(AppError::NotOwner)
        ));
        assert!(matches!(
            QrSessionService::deactivate(&db, owner.id, 9999, now).await,
            Err(AppError::NotFound(_))
        ));

        let first = QrSessionService::deactivate(&db, owner.id, s.id, now)
            .await
            .unwrap();
        assert!(!first.active);

        // second call is a no-op success
        let second = QrSessionService::deactivate(&db, owner.id, s.id, now)
            .await
            .unwrap();
        assert!(!second.active);
    }

    #[tokio::test]
    async fn sweep_flips_only_expired_active_sessions() {
        let db = setup_test_db().await;
        let t = teacher(&db, "sweep_lect").await;
        let t0 = Utc.with_ymd_and_hms(2026, 8, 28, 9, 0, 0).unwrap();

        let expired = QrSessionService::generate(&db, params(t.id, 10), t0)
            .await
            .unwrap();
        let live = QrSessionService::generate(&db, params(t.id, 60), t0)
            .await
            .unwrap();

        let flipped = QrSessionService::sweep_expired(&db, t0 + Duration::minutes(10))
            .await
            .unwrap();
        assert_eq!(flipped, 1);

        let expired = Entity::find_by_id(expired.id).one(&db).await.unwrap().unwrap();
        let live = Entity::find_by_id(live.id).one(&db).await.unwrap().unwrap();
        assert!(!expired.active);
        assert!(live.active);

        // repeat sweep finds nothing new
        let again = QrSessionService::sweep_expired(&db, t0 + Duration::minutes(10))
            .await
            .unwrap();
        assert_eq!(again, 0);
    }

    #[tokio::test]
    async fn history_is_scoped_to_teacher_and_paginated() {
        let db = setup_test_db().await;
        let a = teacher(&db, "hist_a").await;
        let b = teacher(&db, "hist_b").await;
        let t0 = Utc.with_ymd_and_hms(2026, 8, 28, 9, 0, 0).unwrap();

        for i in 0..3 {
            QrSessionService::generate(&db, params(a.id, 10), t0 + Duration::minutes(i))
                .await
                .unwrap();
        }
        QrSessionService::generate(&db, params(b.id, 10), t0)
            .await
            .unwrap();

        let (page, total) = QrSessionService::history(&db, a.id, None, 1, 2).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
        // newest first
        assert!(page[0].created_at > page[1].created_at);

        let day = t0.date_naive();
        let (on_day, total) = QrSessionService::history(&db, a.id, Some(day), 1, 10)
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(on_day.len(), 3);

        let next_day = day.succ_opt().unwrap();
        let (empty, total) = QrSessionService::history(&db, a.id, Some(next_day), 1, 10)
            .await
            .unwrap();
        assert_eq!(total, 0);
        assert!(empty.is_empty());
    }
}
