use chrono::NaiveDate;
use thiserror::Error;

/// Validation failures raised while reading or aggregating attendance data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AttendanceError {
    #[error("unknown attendance status: '{0}'")]
    UnknownStatus(String),

    #[error("record {record_id} references unknown student {student_id}")]
    UnknownStudent { record_id: String, student_id: String },

    #[error("student not found: {0}")]
    StudentNotFound(String),

    #[error("duplicate attendance record for student {student_id} on {date}")]
    DuplicateRecord { student_id: String, date: NaiveDate },

    #[error("duplicate student id: {0}")]
    DuplicateStudent(String),

    #[error("duplicate roll number: {0}")]
    DuplicateRollNumber(String),

    #[error("could not parse date: '{0}'")]
    InvalidDate(String),
}
