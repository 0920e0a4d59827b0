use crate::model::attendance::AttendanceRecord;
use crate::model::student::Student;
use anyhow::Result;
use chrono::NaiveDate;

pub trait StudentRepository {
    fn list(&self) -> Result<Vec<Student>>;
    fn get(&self, id: &str) -> Result<Student>;
    fn find_by_roll_number(&self, roll_number: &str) -> Result<Option<Student>>;
}

pub trait AttendanceRepository {
    fn list(&self) -> Result<Vec<AttendanceRecord>>;
    fn list_for_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>>;
    fn list_for_student(&self, student_id: &str) -> Result<Vec<AttendanceRecord>>;
    /// Inserts or replaces the record keyed by (student_id, date).
    fn upsert(&self, record: AttendanceRecord) -> Result<AttendanceRecord>;
}
