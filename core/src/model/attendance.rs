use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AttendanceError;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Late,
        AttendanceStatus::Excused,
    ];

    /// Present and late both count toward the attendance rate.
    pub fn is_attending(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Excused => "excused",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::Excused => "Excused",
        }
    }

    pub fn default_remark(self) -> Option<&'static str> {
        match self {
            AttendanceStatus::Present => None,
            AttendanceStatus::Absent => Some("No reason provided"),
            AttendanceStatus::Late => Some("Arrived 15 minutes late"),
            AttendanceStatus::Excused => Some("Doctor's appointment"),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "present" | "p" => Ok(AttendanceStatus::Present),
            "absent" | "a" => Ok(AttendanceStatus::Absent),
            "late" | "l" => Ok(AttendanceStatus::Late),
            "excused" | "e" => Ok(AttendanceStatus::Excused),
            _ => Err(AttendanceError::UnknownStatus(s.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl AttendanceRecord {
    pub fn new(student_id: &str, date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            id: record_id(student_id, date),
            student_id: student_id.to_string(),
            date,
            status,
            remarks: status.default_remark().map(str::to_string),
        }
    }

    pub fn with_remarks(mut self, remarks: Option<String>) -> Self {
        self.remarks = remarks;
        self
    }
}

pub fn record_id(student_id: &str, date: NaiveDate) -> String {
    format!("{}-{}", student_id, date.format("%Y-%m-%d"))
}
