use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::model::attendance::AttendanceRecord;
use crate::model::stats::{AttendanceStats, ClassStats, OverallStats, StatusBreakdown, StudentReport, TrendPoint};
use crate::model::student::Student;
use crate::repository::{AttendanceRepository, StudentRepository};
use crate::service::aggregation::{self, TrendScope};
use crate::service::sheet::AttendanceSheet;
use crate::error::AttendanceError;

pub struct AttendanceService<R: StudentRepository + AttendanceRepository> {
    repo: R,
}

impl<R: StudentRepository + AttendanceRepository> AttendanceService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn students(&self) -> Result<Vec<Student>> {
        StudentRepository::list(&self.repo)
    }

    pub fn records(&self) -> Result<Vec<AttendanceRecord>> {
        AttendanceRepository::list(&self.repo)
    }

    pub fn search_students(&self, term: &str) -> Result<Vec<Student>> {
        let students = self.students()?;
        Ok(students.into_iter().filter(|s| s.matches(term)).collect())
    }

    /// Looks a student up by internal id first, then by roll number.
    pub fn resolve_student(&self, key: &str) -> Result<Student> {
        if let Ok(student) = self.repo.get(key) {
            return Ok(student);
        }
        self.repo
            .find_by_roll_number(key)?
            .ok_or_else(|| AttendanceError::StudentNotFound(key.to_string()).into())
    }

    pub fn class_stats(&self, date: NaiveDate) -> Result<ClassStats> {
        let students = self.students()?;
        let records = self.records()?;
        let stats = aggregation::class_stats_for_date(&records, &students, date)
            .with_context(|| format!("Failed to compute class stats for {}", date))?;
        Ok(stats)
    }

    pub fn student_stats(&self, student_id: &str) -> Result<AttendanceStats> {
        let student = self.repo.get(student_id)?;
        let records = self.repo.list_for_student(&student.id)?;
        Ok(aggregation::student_stats(&records, &student.id))
    }

    pub fn student_reports(&self) -> Result<Vec<StudentReport>> {
        let students = self.students()?;
        let records = self.records()?;
        aggregation::validate(&records, &students)?;
        Ok(aggregation::student_reports(&records, &students))
    }

    pub fn overall(&self, threshold: f64) -> Result<OverallStats> {
        let reports = self.student_reports()?;
        Ok(aggregation::overall_stats(&reports, threshold))
    }

    pub fn breakdown(&self) -> Result<StatusBreakdown> {
        let records = self.validated_records()?;
        Ok(aggregation::status_breakdown(&records))
    }

    pub fn trend(&self, scope: TrendScope, days: u32, today: NaiveDate) -> Result<Vec<TrendPoint>> {
        let records = self.validated_records()?;
        Ok(aggregation::trend(&records, scope, days, today).collect())
    }

    fn validated_records(&self) -> Result<Vec<AttendanceRecord>> {
        let records = self.records()?;
        aggregation::validate(&records, &self.students()?)?;
        Ok(records)
    }

    pub fn sheet_for(&self, date: NaiveDate) -> Result<AttendanceSheet> {
        let records = self.repo.list_for_date(date)?;
        debug!(%date, records = records.len(), "loaded attendance sheet");
        Ok(AttendanceSheet::from_records(date, &records))
    }

    /// Writes every changed mark through the store's upsert and returns how
    /// many records were written.
    pub fn commit(&self, sheet: &mut AttendanceSheet) -> Result<usize> {
        let pending = sheet.pending_records();
        for record in &pending {
            self.repo
                .upsert(record.clone())
                .with_context(|| format!("Failed to save attendance for student {}", record.student_id))?;
        }
        sheet.mark_clean();
        info!(date = %sheet.date(), written = pending.len(), "committed attendance sheet");
        Ok(pending.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::sample_roster;
    use crate::model::attendance::AttendanceStatus;
    use crate::repository::InMemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn service() -> AttendanceService<InMemoryStore> {
        let records = vec![
            AttendanceRecord::new("1", day(1), AttendanceStatus::Present),
            AttendanceRecord::new("2", day(1), AttendanceStatus::Absent),
            AttendanceRecord::new("1", day(2), AttendanceStatus::Late),
        ];
        AttendanceService::new(InMemoryStore::new(sample_roster(), records).unwrap())
    }

    #[test]
    fn test_commit_upserts_sheet() {
        let service = service();
        let mut sheet = service.sheet_for(day(1)).unwrap();
        assert_eq!(sheet.status_of("2"), Some(AttendanceStatus::Absent));

        sheet.mark("2", AttendanceStatus::Excused);
        sheet.mark("3", AttendanceStatus::Present);
        assert_eq!(service.commit(&mut sheet).unwrap(), 2);
        assert!(!sheet.has_changes());

        let stats = service.class_stats(day(1)).unwrap();
        assert_eq!(stats.present_today, 2);
        assert_eq!(stats.absent_today, 0);
        assert_eq!(stats.excused_today, 1);
        assert_eq!(service.records().unwrap().len(), 4);

        assert_eq!(service.commit(&mut sheet).unwrap(), 0);
    }

    #[test]
    fn test_commit_rejects_unknown_student() {
        let service = service();
        let mut sheet = service.sheet_for(day(1)).unwrap();
        sheet.mark("ghost", AttendanceStatus::Present);
        assert!(service.commit(&mut sheet).is_err());
    }

    #[test]
    fn test_search_and_resolve() {
        let service = service();
        assert_eq!(service.search_students("").unwrap().len(), 6);
        let found = service.search_students("WIL").unwrap();
        let names: Vec<_> = found.iter().map(|s| s.first_name.as_str()).collect();
        assert_eq!(names, vec!["Liam", "Ethan"]);

        assert_eq!(service.resolve_student("4").unwrap().first_name, "Noah");
        assert_eq!(service.resolve_student("2024005").unwrap().first_name, "Ava");
        assert!(service.resolve_student("missing").is_err());
    }

    #[test]
    fn test_student_stats_requires_known_student() {
        let service = service();
        let stats = service.student_stats("1").unwrap();
        assert_eq!(stats.total_days, 2);
        assert_eq!(stats.rounded_rate(), 100);

        let err = service.student_stats("nobody").unwrap_err();
        assert!(err.downcast_ref::<AttendanceError>().is_some());
    }

    struct MockRepo {
        students: Vec<Student>,
        records: Vec<AttendanceRecord>,
    }

    impl StudentRepository for MockRepo {
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

    impl AttendanceRepository for MockRepo {
        fn list(&self) -> Result<Vec<AttendanceRecord>> {
            Ok(self.records.clone())
        }
        fn list_for_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>> {
            Ok(self.records.iter().filter(|r| r.date == date).cloned().collect())
        }
        fn list_for_student(&self, student_id: &str) -> Result<Vec<AttendanceRecord>> {
            Ok(self.records.iter().filter(|r| r.student_id == student_id).cloned().collect())
        }
        fn upsert(&self, record: AttendanceRecord) -> Result<AttendanceRecord> {
            Ok(record)
        }
    }

    #[test]
    fn test_dangling_reference_surfaces_unknown_student() {
        let service = AttendanceService::new(MockRepo {
            students: sample_roster(),
            records: vec![AttendanceRecord::new("99", day(1), AttendanceStatus::Present)],
        });

        let err = service.class_stats(day(1)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AttendanceError>(),
            Some(AttendanceError::UnknownStudent { .. })
        ));
        assert!(service.student_reports().is_err());

        let unknown = |err: anyhow::Error| {
            matches!(err.downcast_ref::<AttendanceError>(), Some(AttendanceError::UnknownStudent { .. }))
        };
        assert!(unknown(service.breakdown().unwrap_err()));
        assert!(unknown(service.trend(TrendScope::All, 7, day(1)).unwrap_err()));
    }

    #[test]
    fn test_overall_and_trend() {
        let service = service();
        let overall = service.overall(85.0).unwrap();
        assert_eq!(overall.total_students, 6);
        assert_eq!(overall.perfect_attendance, 1);
        assert_eq!(overall.below_threshold, 5);

        let trend = service.trend(TrendScope::All, 2, day(2)).unwrap();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].rate, 50.0);
        assert_eq!(trend[1].rate, 100.0);
    }
}
