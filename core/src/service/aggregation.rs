use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::error::AttendanceError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::stats::{
    percentage, AttendanceStats, ClassStats, OverallStats, StatusBreakdown, StudentReport, TrendPoint,
};
use crate::model::student::Student;

/// Window used for `ClassStats::average_attendance`.
pub const AVERAGE_WINDOW_DAYS: u32 = 30;

/// Checks roster uniqueness, that every record resolves to a student, and
/// that no (student, date) pair is recorded twice.
pub fn validate(records: &[AttendanceRecord], students: &[Student]) -> Result<(), AttendanceError> {
    let mut ids = HashSet::new();
    let mut rolls = HashSet::new();
    for student in students {
        if !ids.insert(student.id.as_str()) {
            return Err(AttendanceError::DuplicateStudent(student.id.clone()));
        }
        if !rolls.insert(student.roll_number.as_str()) {
            return Err(AttendanceError::DuplicateRollNumber(student.roll_number.clone()));
        }
    }

    let mut seen = HashSet::new();
    for record in records {
        if !ids.contains(record.student_id.as_str()) {
            return Err(unknown_student(record));
        }
        if !seen.insert((record.student_id.as_str(), record.date)) {
            return Err(AttendanceError::DuplicateRecord {
                student_id: record.student_id.clone(),
                date: record.date,
            });
        }
    }
    Ok(())
}

fn unknown_student(record: &AttendanceRecord) -> AttendanceError {
    AttendanceError::UnknownStudent {
        record_id: record.id.clone(),
        student_id: record.student_id.clone(),
    }
}

pub fn class_stats_for_date(
    records: &[AttendanceRecord],
    students: &[Student],
    date: NaiveDate,
) -> Result<ClassStats, AttendanceError> {
    let ids: HashSet<&str> = students.iter().map(|s| s.id.as_str()).collect();
    let mut stats = ClassStats::empty(date);
    stats.total_students = students.len();

    for record in records.iter().filter(|r| r.date == date) {
        if !ids.contains(record.student_id.as_str()) {
            return Err(unknown_student(record));
        }
        match record.status {
            AttendanceStatus::Present => stats.present_today += 1,
            AttendanceStatus::Absent => stats.absent_today += 1,
            AttendanceStatus::Late => stats.late_today += 1,
            AttendanceStatus::Excused => stats.excused_today += 1,
        }
    }

    stats.today_rate = percentage(stats.present_today + stats.late_today, stats.total_students);
    stats.average_attendance = window_average(records, date, AVERAGE_WINDOW_DAYS);
    debug!(%date, recorded = stats.recorded_today(), "computed class stats");
    Ok(stats)
}

pub fn student_stats(records: &[AttendanceRecord], student_id: &str) -> AttendanceStats {
    let mut stats = AttendanceStats::default();
    for record in records.iter().filter(|r| r.student_id == student_id) {
        stats.add(record.status);
    }
    stats
}

/// Attending share of all records dated within `days` days ending on `end`.
pub fn window_average(records: &[AttendanceRecord], end: NaiveDate, days: u32) -> f64 {
    if days == 0 {
        return 0.0;
    }
    let start = end.checked_sub_days(Days::new(days as u64 - 1)).unwrap_or(NaiveDate::MIN);
    let (attending, total) = records
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
        .fold((0, 0), |(attending, total), r| {
            (attending + r.status.is_attending() as usize, total + 1)
        });
    percentage(attending, total)
}

pub fn student_reports(records: &[AttendanceRecord], students: &[Student]) -> Vec<StudentReport> {
    students
        .iter()
        .map(|student| {
            let stats = student_stats(records, &student.id);
            StudentReport {
                student: student.clone(),
                stats,
                rating: stats.rating(),
            }
        })
        .collect()
}

/// Averages per-student rates; a student with no records contributes 0.
pub fn overall_stats(reports: &[StudentReport], threshold: f64) -> OverallStats {
    let total_students = reports.len();
    let average_attendance = if total_students == 0 {
        0.0
    } else {
        reports.iter().map(|r| r.stats.attendance_rate).sum::<f64>() / total_students as f64
    };

    OverallStats {
        total_students,
        average_attendance,
        perfect_attendance: reports
            .iter()
            .filter(|r| r.stats.total_days > 0 && r.stats.attendance_rate >= 100.0)
            .count(),
        below_threshold: reports.iter().filter(|r| r.stats.attendance_rate < threshold).count(),
        threshold,
    }
}

pub fn status_breakdown(records: &[AttendanceRecord]) -> StatusBreakdown {
    let mut breakdown = StatusBreakdown::default();
    for record in records {
        match record.status {
            AttendanceStatus::Present => breakdown.present += 1,
            AttendanceStatus::Absent => breakdown.absent += 1,
            AttendanceStatus::Late => breakdown.late += 1,
            AttendanceStatus::Excused => breakdown.excused += 1,
        }
    }
    breakdown
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrendScope {
    All,
    Students(HashSet<String>),
}

impl TrendScope {
    pub fn students<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TrendScope::Students(ids.into_iter().map(Into::into).collect())
    }

    fn includes(&self, student_id: &str) -> bool {
        match self {
            TrendScope::All => true,
            TrendScope::Students(ids) => ids.contains(student_id),
        }
    }
}

/// Daily attendance rates for a run of days, oldest first.
///
/// Consumed once; build a new one with [`trend`] to walk the days again.
pub struct Trend<'a> {
    records: &'a [AttendanceRecord],
    scope: TrendScope,
    today: NaiveDate,
    remaining: u32,
}

/// Days before `today` that run past the earliest representable date are
/// dropped, so the trend may be shorter than `num_days`.
pub fn trend(records: &[AttendanceRecord], scope: TrendScope, num_days: u32, today: NaiveDate) -> Trend<'_> {
    let available = (today - NaiveDate::MIN).num_days() + 1;
    Trend {
        records,
        scope,
        today,
        remaining: num_days.min(u32::try_from(available).unwrap_or(u32::MAX)),
    }
}

impl Iterator for Trend<'_> {
    type Item = TrendPoint;

    fn next(&mut self) -> Option<TrendPoint> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let date = self.today.checked_sub_days(Days::new(self.remaining as u64))?;

        let (attending, total) = self
            .records
            .iter()
            .filter(|r| r.date == date && self.scope.includes(&r.student_id))
            .fold((0, 0), |(attending, total), r| {
                (attending + r.status.is_attending() as usize, total + 1)
            });

        Some(TrendPoint {
            date,
            day_of_week: date.format("%a").to_string(),
            rate: percentage(attending, total),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl ExactSizeIterator for Trend<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{sample_roster, AttendanceGenerator};
    use crate::model::attendance::AttendanceStatus::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn roster(ids: &[&str]) -> Vec<Student> {
        sample_roster()
            .into_iter()
            .zip(ids)
            .map(|(mut s, id)| {
                s.id = id.to_string();
                s.roll_number = format!("R-{}", id);
                s
            })
            .collect()
    }

    #[test]
    fn test_class_stats_two_students() {
        let students = roster(&["A", "B"]);
        let records = vec![
            AttendanceRecord::new("A", day(1), Present),
            AttendanceRecord::new("B", day(1), Absent),
        ];

        let stats = class_stats_for_date(&records, &students, day(1)).unwrap();
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.present_today, 1);
        assert_eq!(stats.absent_today, 1);
        assert_eq!(stats.late_today, 0);
        assert_eq!(stats.excused_today, 0);
        assert_eq!(stats.today_rate, 50.0);
    }

    #[test]
    fn test_class_stats_counts_sum_to_records_on_date() {
        let students = sample_roster();
        let records = AttendanceGenerator::from_seed(11).generate(&students, day(30), 30);

        for d in 1..=30 {
            let stats = class_stats_for_date(&records, &students, day(d)).unwrap();
            let on_date = records.iter().filter(|r| r.date == day(d)).count();
            assert_eq!(stats.recorded_today(), on_date);
        }
    }

    #[test]
    fn test_class_stats_empty_inputs_are_zero() {
        let stats = class_stats_for_date(&[], &[], day(1)).unwrap();
        assert_eq!(stats, ClassStats::empty(day(1)));
        assert!(!stats.today_rate.is_nan());

        let students = roster(&["A"]);
        let records = vec![AttendanceRecord::new("A", day(2), Present)];
        let stats = class_stats_for_date(&records, &students, day(1)).unwrap();
        assert_eq!(stats.recorded_today(), 0);
        assert_eq!(stats.today_rate, 0.0);
        assert_eq!(stats.unmarked_today(), 1);
    }

    #[test]
    fn test_class_stats_rejects_dangling_student() {
        let students = roster(&["A"]);
        let records = vec![AttendanceRecord::new("ghost", day(1), Present)];
        let err = class_stats_for_date(&records, &students, day(1)).unwrap_err();
        assert_eq!(
            err,
            AttendanceError::UnknownStudent {
                record_id: "ghost-2024-01-01".to_string(),
                student_id: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_student_stats_rate() {
        let records = vec![
            AttendanceRecord::new("A", day(1), Present),
            AttendanceRecord::new("A", day(2), Present),
            AttendanceRecord::new("A", day(3), Late),
            AttendanceRecord::new("A", day(4), Absent),
            AttendanceRecord::new("B", day(1), Absent),
        ];
        let stats = student_stats(&records, "A");
        assert_eq!(stats.total_days, 4);
        assert_eq!(stats.present_days, 2);
        assert_eq!(stats.late_days, 1);
        assert_eq!(stats.absent_days, 1);
        assert_eq!(stats.rounded_rate(), 75);
    }

    #[test]
    fn test_student_stats_perfect_and_empty() {
        let records = vec![
            AttendanceRecord::new("A", day(1), Present),
            AttendanceRecord::new("A", day(2), Late),
        ];
        assert_eq!(student_stats(&records, "A").attendance_rate, 100.0);
        assert_eq!(student_stats(&records, "Z"), AttendanceStats::default());
    }

    #[test]
    fn test_excused_counts_against_rate() {
        let records = vec![
            AttendanceRecord::new("A", day(1), Present),
            AttendanceRecord::new("A", day(2), Excused),
        ];
        let stats = student_stats(&records, "A");
        assert_eq!(stats.excused_days, 1);
        assert_eq!(stats.attendance_rate, 50.0);
    }

    #[test]
    fn test_rates_stay_in_bounds_and_are_idempotent() {
        let students = sample_roster();
        let records = AttendanceGenerator::from_seed(5).generate(&students, day(30), 30);

        for student in &students {
            let first = student_stats(&records, &student.id);
            let second = student_stats(&records, &student.id);
            assert_eq!(first, second);
            assert!((0.0..=100.0).contains(&first.attendance_rate));
        }

        let first = class_stats_for_date(&records, &students, day(15)).unwrap();
        let second = class_stats_for_date(&records, &students, day(15)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_trend_is_oldest_first_with_zero_for_empty_days() {
        let records = vec![
            AttendanceRecord::new("A", day(3), Present),
            AttendanceRecord::new("B", day(3), Absent),
            AttendanceRecord::new("A", day(5), Late),
        ];

        let points: Vec<_> = trend(&records, TrendScope::All, 3, day(5)).collect();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].date, day(3));
        assert_eq!(points[0].rate, 50.0);
        assert_eq!(points[1].date, day(4));
        assert_eq!(points[1].rate, 0.0);
        assert_eq!(points[2].date, day(5));
        assert_eq!(points[2].rate, 100.0);
        assert_eq!(points[2].day_of_week, "Fri");
    }

    #[test]
    fn test_trend_scope_and_exhaustion() {
        let records = vec![
            AttendanceRecord::new("A", day(3), Present),
            AttendanceRecord::new("B", day(3), Absent),
        ];

        let mut points = trend(&records, TrendScope::students(["B"]), 1, day(3));
        assert_eq!(points.len(), 1);
        assert_eq!(points.next().map(|p| p.rate), Some(0.0));
        assert!(points.next().is_none());
        assert!(points.next().is_none());

        assert_eq!(trend(&records, TrendScope::All, 0, day(3)).count(), 0);
    }

    #[test]
    fn test_overall_stats() {
        let students = roster(&["A", "B", "C"]);
        let records = vec![
            AttendanceRecord::new("A", day(1), Present),
            AttendanceRecord::new("A", day(2), Present),
            AttendanceRecord::new("B", day(1), Present),
            AttendanceRecord::new("B", day(2), Absent),
        ];
        let reports = student_reports(&records, &students);
        let overall = overall_stats(&reports, 85.0);

        assert_eq!(overall.total_students, 3);
        assert_eq!(overall.perfect_attendance, 1);
        assert_eq!(overall.below_threshold, 2);
        assert_eq!(overall.average_attendance, 50.0);

        assert_eq!(overall_stats(&[], 85.0).average_attendance, 0.0);
    }

    #[test]
    fn test_window_average_bounds() {
        let records = vec![
            AttendanceRecord::new("A", day(1), Absent),
            AttendanceRecord::new("A", day(10), Present),
            AttendanceRecord::new("A", day(11), Present),
        ];
        assert_eq!(window_average(&records, day(11), 2), 100.0);
        assert!((window_average(&records, day(11), 30) - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(window_average(&records, day(11), 0), 0.0);
    }

    #[test]
    fn test_validate() {
        let students = roster(&["A", "B"]);
        let records = vec![AttendanceRecord::new("A", day(1), Present)];
        assert!(validate(&records, &students).is_ok());

        let dup = vec![
            AttendanceRecord::new("A", day(1), Present),
            AttendanceRecord::new("A", day(1), Late),
        ];
        assert!(matches!(
            validate(&dup, &students),
            Err(AttendanceError::DuplicateRecord { .. })
        ));

        let mut clash = roster(&["A", "B"]);
        clash[1].roll_number = clash[0].roll_number.clone();
        assert_eq!(
            validate(&[], &clash),
            Err(AttendanceError::DuplicateRollNumber("R-A".to_string()))
        );
    }

    #[test]
    fn test_status_breakdown() {
        let records = vec![
            AttendanceRecord::new("A", day(1), Present),
            AttendanceRecord::new("B", day(1), Excused),
            AttendanceRecord::new("A", day(2), Excused),
        ];
        let breakdown = status_breakdown(&records);
        assert_eq!(breakdown.present, 1);
        assert_eq!(breakdown.excused, 2);
        assert_eq!(breakdown.total(), 3);
    }

    #[test]
    fn test_long_ranges_stop_at_earliest_date() {
        let records = vec![AttendanceRecord::new("A", day(1), Present)];

        let mut long = trend(&records, TrendScope::All, 200_000_000, day(1));
        let expected = (day(1) - NaiveDate::MIN).num_days() as usize + 1;
        assert_eq!(long.len(), expected);
        let first = long.next().unwrap();
        assert_eq!(first.date, NaiveDate::MIN);

        let edge: Vec<_> = trend(&records, TrendScope::All, 3, NaiveDate::MIN).collect();
        assert_eq!(edge.len(), 1);
        assert_eq!(edge[0].date, NaiveDate::MIN);

        assert_eq!(window_average(&records, day(1), u32::MAX), 100.0);
    }
}
