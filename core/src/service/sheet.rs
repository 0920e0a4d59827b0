use std::collections::HashMap;

use chrono::NaiveDate;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::stats::StatusBreakdown;
use crate::model::student::Student;

#[derive(Debug, Clone)]
struct Mark {
    status: AttendanceStatus,
    remarks: Option<String>,
    dirty: bool,
}

/// Editable attendance for a single date.
///
/// Seeded from the records already stored for the date. Marks stay local
/// until the sheet is handed to `AttendanceService::commit`.
#[derive(Debug, Clone)]
pub struct AttendanceSheet {
    date: NaiveDate,
    marks: HashMap<String, Mark>,
}

impl AttendanceSheet {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            marks: HashMap::new(),
        }
    }

    pub fn from_records(date: NaiveDate, records: &[AttendanceRecord]) -> Self {
        let marks = records
            .iter()
            .filter(|r| r.date == date)
            .map(|r| {
                (
                    r.student_id.clone(),
                    Mark {
                        status: r.status,
                        remarks: r.remarks.clone(),
                        dirty: false,
                    },
                )
            })
            .collect();
        Self { date, marks }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn mark(&mut self, student_id: &str, status: AttendanceStatus) {
        let unchanged = self
            .marks
            .get(student_id)
            .map(|m| m.status == status)
            .unwrap_or(false);
        if unchanged {
            return;
        }
        self.marks.insert(
            student_id.to_string(),
            Mark {
                status,
                remarks: status.default_remark().map(str::to_string),
                dirty: true,
            },
        );
    }

    pub fn set_remarks(&mut self, student_id: &str, remarks: Option<String>) {
        if let Some(mark) = self.marks.get_mut(student_id) {
            mark.remarks = remarks;
            mark.dirty = true;
        }
    }

    pub fn status_of(&self, student_id: &str) -> Option<AttendanceStatus> {
        self.marks.get(student_id).map(|m| m.status)
    }

    pub fn remarks_of(&self, student_id: &str) -> Option<&str> {
        self.marks.get(student_id).and_then(|m| m.remarks.as_deref())
    }

    pub fn counts(&self) -> StatusBreakdown {
        let mut counts = StatusBreakdown::default();
        for mark in self.marks.values() {
            match mark.status {
                AttendanceStatus::Present => counts.present += 1,
                AttendanceStatus::Absent => counts.absent += 1,
                AttendanceStatus::Late => counts.late += 1,
                AttendanceStatus::Excused => counts.excused += 1,
            }
        }
        counts
    }

    pub fn unmarked<'a>(&self, roster: &'a [Student]) -> Vec<&'a Student> {
        roster.iter().filter(|s| !self.marks.contains_key(&s.id)).collect()
    }

    pub fn has_changes(&self) -> bool {
        self.marks.values().any(|m| m.dirty)
    }

    /// Records for every mark changed since the sheet was loaded, ordered by
    /// student id.
    pub fn pending_records(&self) -> Vec<AttendanceRecord> {
        let mut records: Vec<AttendanceRecord> = self
            .marks
            .iter()
            .filter(|(_, m)| m.dirty)
            .map(|(student_id, m)| {
                AttendanceRecord::new(student_id, self.date, m.status).with_remarks(m.remarks.clone())
            })
            .collect();
        records.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        records
    }

    pub fn mark_clean(&mut self) {
        for mark in self.marks.values_mut() {
            mark.dirty = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::sample_roster;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_seeded_from_records_of_that_date_only() {
        let other = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let records = vec![
            AttendanceRecord::new("1", day(), AttendanceStatus::Late),
            AttendanceRecord::new("2", other, AttendanceStatus::Absent),
        ];
        let sheet = AttendanceSheet::from_records(day(), &records);

        assert_eq!(sheet.status_of("1"), Some(AttendanceStatus::Late));
        assert_eq!(sheet.status_of("2"), None);
        assert!(!sheet.has_changes());
        assert_eq!(sheet.remarks_of("1"), Some("Arrived 15 minutes late"));
    }

    #[test]
    fn test_mark_tracks_changes_and_counts() {
        let roster = sample_roster();
        let mut sheet = AttendanceSheet::new(day());
        sheet.mark("1", AttendanceStatus::Present);
        sheet.mark("2", AttendanceStatus::Absent);
        sheet.mark("3", AttendanceStatus::Absent);
        sheet.mark("3", AttendanceStatus::Excused);

        let counts = sheet.counts();
        assert_eq!(counts.present, 1);
        assert_eq!(counts.absent, 1);
        assert_eq!(counts.excused, 1);
        assert_eq!(sheet.unmarked(&roster).len(), 3);

        let pending = sheet.pending_records();
        assert_eq!(pending.len(), 3);
        assert_eq!(pending[2].id, "3-2024-01-01");
        assert_eq!(pending[2].remarks.as_deref(), Some("Doctor's appointment"));

        sheet.mark_clean();
        assert!(!sheet.has_changes());
        sheet.mark("1", AttendanceStatus::Present);
        assert!(!sheet.has_changes());
    }

    #[test]
    fn test_set_remarks_on_marked_student() {
        let mut sheet = AttendanceSheet::new(day());
        sheet.set_remarks("1", Some("ignored".to_string()));
        assert_eq!(sheet.remarks_of("1"), None);

        sheet.mark("1", AttendanceStatus::Late);
        sheet.set_remarks("1", Some("Bus delay".to_string()));
        assert_eq!(sheet.pending_records()[0].remarks.as_deref(), Some("Bus delay"));
    }
}
