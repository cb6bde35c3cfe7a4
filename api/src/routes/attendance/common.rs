use serde::Serialize;

use db::models::attendance_record::Model as AttendanceRecordModel;
use services::attendance::DailyStats;

#[derive(Debug, Serialize, Default)]
pub struct AttendanceRecordResponse {
    pub id: i64,
    pub session_id: i64,
    pub student_id: i64,
    pub teacher_id: i64,
    pub status: String,
    pub location: String,
    pub course: String,
    pub marked_at: String,
}

impl From<AttendanceRecordModel> for AttendanceRecordResponse {
    fn from(m: AttendanceRecordModel) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            student_id: m.student_id,
            teacher_id: m.teacher_id,
            status: m.status.to_string(),
            location: m.location,
            course: m.course,
            marked_at: m.marked_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct DailyAttendanceResponse {
    pub date: String,
    pub records: Vec<AttendanceRecordResponse>,
    pub stats: DailyStats,
}

#[derive(Debug, Serialize, Default)]
pub struct AttendanceListResponse {
    pub count: usize,
    pub records: Vec<AttendanceRecordResponse>,
}
