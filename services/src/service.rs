use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Error taxonomy for the QR attendance core.
///
/// `InvalidCode`, `CodeExpired` and `AlreadyMarked` are expected, user-facing
/// outcomes: terminal, never retried, not logged as system failures.
/// `GenerationExhausted` and `Db` are operational failures surfaced for
/// visibility.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("QR code not found")]
    InvalidCode,
    #[error("This QR code has expired or is no longer active")]
    CodeExpired,
    #[error("Attendance already recorded for this session")]
    AlreadyMarked,
    #[error("Unable to generate a unique QR code after {0} attempts")]
    GenerationExhausted(u32),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Only the owning teacher may perform this action")]
    NotOwner,
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

/// True when `err` is a unique-constraint violation naming `table_or_column`.
///
/// SQLite reports the offending columns in the message
/// (`UNIQUE constraint failed: qr_sessions.code`), which lets callers decide
/// whether a failed insert was a code collision (retry the draw) or a
/// duplicate marking (map to `AlreadyMarked`).
pub(crate) fn unique_violation_on(err: &DbErr, table_or_column: &str) -> bool {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => msg.contains(table_or_column),
        _ => false,
    }
}
