use chrono::{Duration, Local, NaiveDate};

use crate::error::AttendanceError;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a day relative to `today`.
///
/// Accepts `today`/`tod`, `yesterday`/`yest`, `-Nd` (N days ago) and
/// `YYYY-MM-DD`.
pub fn parse_day(input: &str, today: NaiveDate) -> Result<NaiveDate, AttendanceError> {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "today" | "tod" => return Ok(today),
        "yesterday" | "yest" => return today.pred_opt().ok_or_else(|| invalid(input)),
        _ => {}
    }

    if let Some(rest) = input.strip_prefix('-') {
        if let Some(num_str) = rest.strip_suffix('d') {
            let count: i64 = num_str.parse().map_err(|_| invalid(input))?;
            return Duration::try_days(count)
                .and_then(|offset| today.checked_sub_signed(offset))
                .ok_or_else(|| invalid(input));
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| invalid(input))
}

fn invalid(input: &str) -> AttendanceError {
    AttendanceError::InvalidDate(input.to_string())
}
