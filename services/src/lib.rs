pub mod attendance;
pub mod code;
pub mod qr_session;
pub mod service;

pub use service::AppError;
