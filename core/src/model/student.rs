use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub grade: String,
    pub roll_number: String,
    pub date_of_birth: NaiveDate,
    pub parent_contact: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .collect()
    }

    /// Case-insensitive match against full name, roll number or email.
    /// An empty term matches every student.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.full_name().to_lowercase().contains(&term)
            || self.roll_number.to_lowercase().contains(&term)
            || self.email.to_lowercase().contains(&term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emma() -> Student {
        Student {
            id: "1".to_string(),
            first_name: "Emma".to_string(),
            last_name: "Johnson".to_string(),
            email: "emma.johnson@school.edu".to_string(),
            grade: "10".to_string(),
            roll_number: "2024001".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2008, 3, 15).unwrap(),
            parent_contact: "+1-555-0123".to_string(),
        }
    }

    #[test]
    fn test_matches_name_roll_and_email() {
        let student = emma();
        assert!(student.matches("emma j"));
        assert!(student.matches("JOHNSON"));
        assert!(student.matches("2024001"));
        assert!(student.matches("@school.edu"));
        assert!(student.matches("   "));
        assert!(!student.matches("liam"));
    }

    #[test]
    fn test_initials() {
        assert_eq!(emma().initials(), "EJ");
    }
}
