use std::cell::RefCell;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::AttendanceError;
use crate::model::attendance::{record_id, AttendanceRecord};
use crate::model::student::Student;
use crate::repository::traits::{AttendanceRepository, StudentRepository};
use crate::service::aggregation::validate;

/// Record store held entirely in memory for the lifetime of the process.
pub struct InMemoryStore {
    students: Vec<Student>,
    records: RefCell<Vec<AttendanceRecord>>,
}

impl InMemoryStore {
    /// Builds a store, rejecting dangling references and duplicate keys.
    pub fn new(students: Vec<Student>, records: Vec<AttendanceRecord>) -> Result<Self> {
        validate(&records, &students)?;
        debug!(students = students.len(), records = records.len(), "record store loaded");
        Ok(Self {
            students,
            records: RefCell::new(records),
        })
    }

    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    pub fn record_count(&self) -> usize {
        self.records.borrow().len()
    }
}

impl StudentRepository for InMemoryStore {
    fn list(&self) -> Result<Vec<Student>> {
        Ok(self.students.clone())
    }

    fn get(&self, id: &str) -> Result<Student> {
        self.students
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| AttendanceError::StudentNotFound(id.to_string()).into())
    }

    fn find_by_roll_number(&self, roll_number: &str) -> Result<Option<Student>> {
        Ok(self.students.iter().find(|s| s.roll_number == roll_number).cloned())
    }
}

impl AttendanceRepository for InMemoryStore {
    fn list(&self) -> Result<Vec<AttendanceRecord>> {
        Ok(self.records.borrow().clone())
    }

    fn list_for_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>> {
        Ok(self.records.borrow().iter().filter(|r| r.date == date).cloned().collect())
    }

    fn list_for_student(&self, student_id: &str) -> Result<Vec<AttendanceRecord>> {
        Ok(self
            .records
            .borrow()
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect())
    }

    fn upsert(&self, mut record: AttendanceRecord) -> Result<AttendanceRecord> {
        if !self.students.iter().any(|s| s.id == record.student_id) {
            warn!(student_id = %record.student_id, "rejected record for unknown student");
            return Err(AttendanceError::UnknownStudent {
                record_id: record.id,
                student_id: record.student_id,
            }
            .into());
        }

        let mut records = self.records.borrow_mut();
        if let Some(pos) = records
            .iter()
            .position(|r| r.student_id == record.student_id && r.date == record.date)
        {
            record.id = records[pos].id.clone();
            debug!(id = %record.id, status = %record.status, "replacing attendance record");
            records[pos] = record.clone();
        } else {
            if record.id.is_empty() {
                record.id = record_id(&record.student_id, record.date);
            }
            debug!(id = %record.id, status = %record.status, "inserting attendance record");
            records.push(record.clone());
        }
        Ok(record)
    }
}
