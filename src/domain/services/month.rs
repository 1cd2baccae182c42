use chrono::{Datelike, Duration, NaiveDate};
use crate::error::AppError;

/// Parses "YYYY-MM" (4-digit year, 2-digit month).
pub fn parse_month(input: &str) -> Result<(i32, u32), AppError> {
    let (year_str, month_str) = input
        .split_once('-')
        .ok_or_else(|| AppError::Validation(format!("Invalid month format: {}", input)))?;

    if year_str.len() != 4 || month_str.len() != 2 {
        return Err(AppError::Validation(format!("Invalid month format: {}", input)));
    }

    let year: i32 = year_str
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid month format: {}", input)))?;
    let month: u32 = month_str
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid month format: {}", input)))?;

    if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
        return Err(AppError::Validation(format!("Invalid month: {}", input)));
    }

    Ok((year, month))
}

/// Strict "YYYY-MM-DD" calendar date. Dates stay timezone-free end to end.
pub fn parse_day(input: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date: {}", input)))
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// First and last day of the month, inclusive.
pub fn month_bounds(year: i32, month: u32) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month");
    let (ny, nm) = next_month(year, month);
    let last = NaiveDate::from_ymd_opt(ny, nm, 1).expect("valid month") - Duration::days(1);
    (first, last)
}

pub fn month_dates(year: i32, month: u32) -> Vec<NaiveDate> {
    let (first, last) = month_bounds(year, month);
    let mut dates = Vec::with_capacity(31);
    let mut cursor = first;
    while cursor <= last {
        dates.push(cursor);
        cursor += Duration::days(1);
    }
    dates
}

pub fn in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

/// 0 = Monday .. 6 = Sunday, matching Schedule.day_of_week.
pub fn weekday_index(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_monday() as i32
}
