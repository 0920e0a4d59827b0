use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::attendance::AttendanceStatus;
use crate::model::stats::ClassStats;
use crate::repository::{AttendanceRepository, StudentRepository};
use crate::service::attendance_service::AttendanceService;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Activity {
    pub student_name: String,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
}

impl Activity {
    pub fn action(&self) -> String {
        format!("Marked {}", self.status.label())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub stats: ClassStats,
    pub recent_activity: Vec<Activity>,
}

pub struct DashboardUseCase<'a, R: StudentRepository + AttendanceRepository> {
    service: &'a AttendanceService<R>,
}

impl<'a, R: StudentRepository + AttendanceRepository> DashboardUseCase<'a, R> {
    pub fn new(service: &'a AttendanceService<R>) -> Self {
        Self { service }
    }

    /// Class stats for `date` plus up to `limit` marks from that day,
    /// exceptions (anything not present) first.
    pub fn build(&self, date: NaiveDate, limit: usize) -> Result<Dashboard> {
        let stats = self.service.class_stats(date)?;
        let students = self.service.students()?;
        let sheet = self.service.sheet_for(date)?;

        let mut recent_activity: Vec<Activity> = students
            .iter()
            .filter_map(|student| {
                sheet.status_of(&student.id).map(|status| Activity {
                    student_name: student.full_name(),
                    status,
                    remarks: sheet.remarks_of(&student.id).map(str::to_string),
                })
            })
            .collect();
        recent_activity.sort_by_key(|a| a.status == AttendanceStatus::Present);
        recent_activity.truncate(limit);

        Ok(Dashboard { stats, recent_activity })
    }
}
