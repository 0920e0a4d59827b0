use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

use crate::model::attendance::AttendanceStatus;
use crate::model::student::Student;

/// Percentage of `part` over `whole`, or 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Half-up rounding to the integer shown in views.
pub fn round_rate(rate: f64) -> u32 {
    rate.clamp(0.0, 100.0).round() as u32
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct AttendanceStats {
    pub total_days: usize,
    pub present_days: usize,
    pub absent_days: usize,
    pub late_days: usize,
    pub excused_days: usize,
    pub attendance_rate: f64,
}

impl AttendanceStats {
    pub fn add(&mut self, status: AttendanceStatus) {
        self.total_days += 1;
        match status {
            AttendanceStatus::Present => self.present_days += 1,
            AttendanceStatus::Absent => self.absent_days += 1,
            AttendanceStatus::Late => self.late_days += 1,
            AttendanceStatus::Excused => self.excused_days += 1,
        }
        self.attendance_rate = percentage(self.attended_days(), self.total_days);
    }

    pub fn attended_days(&self) -> usize {
        self.present_days + self.late_days
    }

    pub fn rounded_rate(&self) -> u32 {
        round_rate(self.attendance_rate)
    }

    pub fn rating(&self) -> Rating {
        Rating::from_rate(self.attendance_rate)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    NeedsAttention,
}

impl Rating {
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 95.0 {
            Rating::Excellent
        } else if rate >= 85.0 {
            Rating::Good
        } else if rate >= 75.0 {
            Rating::Fair
        } else {
            Rating::NeedsAttention
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::Fair => "Fair",
            Rating::NeedsAttention => "Needs Attention",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ClassStats {
    pub date: NaiveDate,
    pub total_students: usize,
    pub present_today: usize,
    pub absent_today: usize,
    pub late_today: usize,
    pub excused_today: usize,
    /// Attending students on `date` over the roster size.
    pub today_rate: f64,
    /// Attending share of every record in the window ending on `date`.
    pub average_attendance: f64,
}

impl ClassStats {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_students: 0,
            present_today: 0,
            absent_today: 0,
            late_today: 0,
            excused_today: 0,
            today_rate: 0.0,
            average_attendance: 0.0,
        }
    }

    pub fn recorded_today(&self) -> usize {
        self.present_today + self.absent_today + self.late_today + self.excused_today
    }

    pub fn unmarked_today(&self) -> usize {
        self.total_students.saturating_sub(self.recorded_today())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StudentReport {
    pub student: Student,
    pub stats: AttendanceStats,
    pub rating: Rating,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct OverallStats {
    pub total_students: usize,
    pub average_attendance: f64,
    pub perfect_attendance: usize,
    pub below_threshold: usize,
    pub threshold: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct StatusBreakdown {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub excused: usize,
}

impl StatusBreakdown {
    pub fn total(&self) -> usize {
        self.present + self.absent + self.late + self.excused
    }

    pub fn count(&self, status: AttendanceStatus) -> usize {
        match status {
            AttendanceStatus::Present => self.present,
            AttendanceStatus::Absent => self.absent,
            AttendanceStatus::Late => self.late,
            AttendanceStatus::Excused => self.excused,
        }
    }

    pub fn share(&self, status: AttendanceStatus) -> f64 {
        percentage(self.count(status), self.total())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub day_of_week: String,
    pub rate: f64,
}

impl TrendPoint {
    pub fn rounded_rate(&self) -> u32 {
        round_rate(self.rate)
    }
}
