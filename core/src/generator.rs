use anyhow::Result;
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::student::Student;
use crate::repository::InMemoryStore;

/// Draw weights, in `AttendanceStatus::ALL` order.
pub const STATUS_WEIGHTS: [f64; 4] = [0.85, 0.08, 0.05, 0.02];

pub struct AttendanceGenerator<R: Rng = StdRng> {
    rng: R,
}

impl AttendanceGenerator<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> AttendanceGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn draw_status(&mut self) -> AttendanceStatus {
        let roll: f64 = self.rng.gen();
        let mut cumulative = 0.0;
        for (status, weight) in AttendanceStatus::ALL.iter().zip(STATUS_WEIGHTS) {
            cumulative += weight;
            if roll <= cumulative {
                return *status;
            }
        }
        AttendanceStatus::Present
    }

    /// One record per student per day for `days` days ending on `today`,
    /// stopping early at the earliest representable date.
    pub fn generate(&mut self, students: &[Student], today: NaiveDate, days: u32) -> Vec<AttendanceRecord> {
        let mut records = Vec::new();
        for offset in 0..days {
            let Some(date) = today.checked_sub_days(Days::new(offset as u64)) else {
                break;
            };
            for student in students {
                let status = self.draw_status();
                records.push(AttendanceRecord::new(&student.id, date, status));
            }
        }
        info!(records = records.len(), days, "generated synthetic attendance");
        records
    }
}

/// Returns `seed`, or a freshly drawn one so the run can be reproduced
/// from the logs.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}

/// The demo roster with `days` days of history ending on `today`.
pub fn demo_store(seed: u64, today: NaiveDate, days: u32) -> Result<InMemoryStore> {
    let roster = sample_roster();
    let records = AttendanceGenerator::from_seed(seed).generate(&roster, today, days);
    info!(seed, "seeded demo data");
    InMemoryStore::new(roster, records)
}

fn student(
    id: &str,
    first_name: &str,
    last_name: &str,
    roll_number: &str,
    (year, month, day): (i32, u32, u32),
    parent_contact: &str,
) -> Student {
    Student {
        id: id.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{}.{}@school.edu", first_name.to_lowercase(), last_name.to_lowercase()),
        grade: "10".to_string(),
        roll_number: roll_number.to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
        parent_contact: parent_contact.to_string(),
    }
}

/// The Grade 10 demo roster.
pub fn sample_roster() -> Vec<Student> {
    vec![
        student("1", "Emma", "Johnson", "2024001", (2008, 3, 15), "+1-555-0123"),
        student("2", "Liam", "Williams", "2024002", (2008, 7, 22), "+1-555-0124"),
        student("3", "Olivia", "Brown", "2024003", (2008, 11, 8), "+1-555-0125"),
        student("4", "Noah", "Davis", "2024004", (2008, 1, 30), "+1-555-0126"),
        student("5", "Ava", "Miller", "2024005", (2008, 9, 12), "+1-555-0127"),
        student("6", "Ethan", "Wilson", "2024006", (2008, 5, 18), "+1-555-0128"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashSet;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_same_seed_same_data() {
        let roster = sample_roster();
        let a = AttendanceGenerator::from_seed(7).generate(&roster, today(), 30);
        let b = AttendanceGenerator::from_seed(7).generate(&roster, today(), 30);
        assert_eq!(a, b);
    }

    #[test]
    fn test_one_record_per_student_per_day() {
        let roster = sample_roster();
        let records = AttendanceGenerator::from_seed(1).generate(&roster, today(), 30);
        assert_eq!(records.len(), 6 * 30);

        let keys: HashSet<_> = records.iter().map(|r| (r.student_id.clone(), r.date)).collect();
        assert_eq!(keys.len(), records.len());

        let oldest = records.iter().map(|r| r.date).min().unwrap();
        let newest = records.iter().map(|r| r.date).max().unwrap();
        assert_eq!(newest, today());
        assert_eq!(oldest, today() - Duration::days(29));
    }

    #[test]
    fn test_draw_is_mostly_present() {
        let mut generator = AttendanceGenerator::from_seed(42);
        let present = (0..10_000)
            .filter(|_| generator.draw_status() == AttendanceStatus::Present)
            .count();
        assert!(present > 8_000 && present < 9_000, "present draws: {}", present);
    }

    #[test]
    fn test_demo_store_is_reproducible() {
        let a = demo_store(9, today(), 5).unwrap();
        let b = demo_store(9, today(), 5).unwrap();
        assert_eq!(a.record_count(), 30);
        assert_eq!(
            crate::repository::AttendanceRepository::list(&a).unwrap(),
            crate::repository::AttendanceRepository::list(&b).unwrap()
        );
        assert_eq!(resolve_seed(Some(3)), 3);
    }

    #[test]
    fn test_roster_is_unique() {
        let roster = sample_roster();
        let rolls: HashSet<_> = roster.iter().map(|s| s.roll_number.as_str()).collect();
        assert_eq!(rolls.len(), roster.len());
        assert_eq!(roster[0].email, "emma.johnson@school.edu");
    }

    #[test]
    fn test_generate_stops_at_earliest_date() {
        let roster = sample_roster();
        let start = NaiveDate::MIN + Duration::days(2);
        let records = AttendanceGenerator::from_seed(1).generate(&roster, start, 30);
        assert_eq!(records.len(), roster.len() * 3);
        assert_eq!(records.iter().map(|r| r.date).min(), Some(NaiveDate::MIN));
    }
}
