//! Read-only month grid, Monday-first, with the current day starred.

use chrono::{Datelike, Local, NaiveDate};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month as usize - 1).min(11)]
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first =
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_else(|| Local::now().date_naive());
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .unwrap_or(first);
    next.pred_opt().map(|d| d.day()).unwrap_or(28)
}

/// Steps a (year, month) pair by `delta` months, carrying across years.
pub fn step_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let total = year * 12 + month as i32 - 1 + delta;
    (total.div_euclid(12), total.rem_euclid(12) as u32 + 1)
}

/// Renders a month as text lines: a title, the weekday heading, then one
/// row per week. `today` marks that day-of-month with `*`.
pub fn month_grid(year: i32, month: u32, today: Option<u32>) -> Vec<String> {
    let mut lines = vec![
        format!("{} {}", month_name(month), year),
        String::new(),
        " Mo  Tu  We  Th  Fr  Sa  Su ".to_string(),
    ];

    let first = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d,
        None => return lines,
    };
    let days = days_in_month(year, month);
    let lead = first.weekday().num_days_from_monday();

    let mut row = String::new();
    let mut slot = 0;
    for _ in 0..lead {
        row.push_str("    ");
        slot += 1;
    }
    for day in 1..=days {
        if today == Some(day) {
            row.push_str(&format!(" {day:2}*"));
        } else {
            row.push_str(&format!(" {day:2} "));
        }
        slot += 1;
        if slot == 7 {
            lines.push(std::mem::take(&mut row));
            slot = 0;
        }
    }
    if !row.is_empty() {
        lines.push(row);
    }
    lines
}

/// Day-of-month to mark, when the displayed month is the current one.
pub fn today_in(year: i32, month: u32) -> Option<u32> {
    let now = Local::now().date_naive();
    (now.year() == year && now.month() == month).then(|| now.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn january_2025_layout() {
        // 2025-01-01 was a Wednesday.
        let lines = month_grid(2025, 1, None);
        assert_eq!(lines[0], "January 2025");
        assert_eq!(lines[2], " Mo  Tu  We  Th  Fr  Sa  Su ");
        assert_eq!(lines[3], "          1   2   3   4   5 ");
        assert_eq!(lines[4], "  6   7   8   9  10  11  12 ");
        assert!(lines.last().unwrap().contains("31"));
    }

    #[test]
    fn today_is_starred() {
        let lines = month_grid(2025, 1, Some(24));
        assert!(lines.iter().any(|l| l.contains(" 24*")));
        let plain = month_grid(2025, 1, None);
        assert!(!plain.iter().any(|l| l.contains('*')));
    }

    #[test]
    fn leap_and_ordinary_february() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn month_stepping_carries_years() {
        assert_eq!(step_month(2025, 1, -1), (2024, 12));
        assert_eq!(step_month(2025, 12, 1), (2026, 1));
        assert_eq!(step_month(2025, 6, 0), (2025, 6));
        assert_eq!(step_month(2025, 6, -18), (2023, 12));
    }
}
