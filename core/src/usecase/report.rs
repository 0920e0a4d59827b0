use std::fmt::Write;

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::attendance::AttendanceStatus;
use crate::model::stats::{OverallStats, StatusBreakdown, StudentReport, TrendPoint};
use crate::repository::{AttendanceRepository, StudentRepository};
use crate::service::aggregation::{overall_stats, TrendScope};
use crate::service::attendance_service::AttendanceService;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AttendanceReport {
    pub generated_on: NaiveDate,
    pub overall: OverallStats,
    pub students: Vec<StudentReport>,
    pub breakdown: StatusBreakdown,
    pub trend: Vec<TrendPoint>,
}

impl AttendanceReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        let overall = &self.overall;

        let _ = writeln!(output, "# Attendance Report");
        let _ = writeln!(output, "Generated on {}", self.generated_on);
        let _ = writeln!(output);
        let _ = writeln!(output, "## Overview");
        let _ = writeln!(output, "- Total students: {}", overall.total_students);
        let _ = writeln!(output, "- Average attendance: {:.0}%", overall.average_attendance);
        let _ = writeln!(output, "- Perfect attendance: {}", overall.perfect_attendance);
        let _ = writeln!(
            output,
            "- Below {:.0}%: {}",
            overall.threshold, overall.below_threshold
        );

        let _ = writeln!(output);
        let _ = writeln!(output, "## Status Distribution");
        if self.breakdown.total() == 0 {
            let _ = writeln!(output, "No attendance recorded.");
        } else {
            for status in AttendanceStatus::ALL {
                let _ = writeln!(
                    output,
                    "- {}: {} ({:.1}%)",
                    status.label(),
                    self.breakdown.count(status),
                    self.breakdown.share(status)
                );
            }
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "## Last {} Days", self.trend.len());
        for point in &self.trend {
            let _ = writeln!(output, "- {} {}: {}%", point.day_of_week, point.date, point.rounded_rate());
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "## Students");
        if self.students.is_empty() {
            let _ = writeln!(output, "No students enrolled.");
        } else {
            let _ = writeln!(output, "| Student | Roll | Present | Late | Absent | Excused | Rate | Rating |");
            let _ = writeln!(output, "|---|---|---|---|---|---|---|---|");
            for report in &self.students {
                let stats = &report.stats;
                let flag = if stats.attendance_rate < overall.threshold { " !" } else { "" };
                let _ = writeln!(
                    output,
                    "| {} | {} | {} | {} | {} | {} | {}%{} | {} |",
                    report.student.full_name(),
                    report.student.roll_number,
                    stats.present_days,
                    stats.late_days,
                    stats.absent_days,
                    stats.excused_days,
                    stats.rounded_rate(),
                    flag,
                    report.rating
                );
            }
        }
        output
    }
}

pub struct ReportUseCase<'a, R: StudentRepository + AttendanceRepository> {
    service: &'a AttendanceService<R>,
}

impl<'a, R: StudentRepository + AttendanceRepository> ReportUseCase<'a, R> {
    pub fn new(service: &'a AttendanceService<R>) -> Self {
        Self { service }
    }

    pub fn build(&self, today: NaiveDate, trend_days: u32, threshold: f64) -> Result<AttendanceReport> {
        let students = self.service.student_reports()?;
        let overall = overall_stats(&students, threshold);
        let breakdown = self.service.breakdown()?;
        let trend = self.service.trend(TrendScope::All, trend_days, today)?;

        Ok(AttendanceReport {
            generated_on: today,
            overall,
            students,
            breakdown,
            trend,
        })
    }
}
