pub mod attendance_record;
pub mod qr_session;
pub mod user;
