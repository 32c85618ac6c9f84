//! Percentage metrics shown on the dashboards.
//!
//! Both rates are rounded to one decimal place and are `0.0` for empty
//! input rather than NaN.

use crate::models::{AttendanceSummaryRow, Task};
use crate::status::TaskStatusCounts;

/// Working days assumed per employee per month.  Fixed policy value, not
/// derived from the calendar; displayed figures elsewhere depend on it.
pub const WORKING_DAYS_PER_MONTH: u32 = 22;

/// Rounds half away from zero to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `finished / total * 100` where finished is `COMPLETED` plus `CLOSE`.
pub fn completion_rate(counts: &TaskStatusCounts) -> f64 {
    if counts.total == 0 {
        return 0.0;
    }
    round_one_decimal(counts.finished() as f64 / counts.total as f64 * 100.0)
}

/// Share of tasks that are completed or closed, as a percentage.
pub fn task_completion_rate(tasks: &[Task]) -> f64 {
    completion_rate(&TaskStatusCounts::from_tasks(tasks))
}

/// Present days over `rows * 22`, as a percentage.
///
/// Not clamped: a month with overtime attendance can exceed 100.
pub fn attendance_rate(rows: &[AttendanceSummaryRow]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let present: u64 = rows.iter().map(|r| u64::from(r.present_days)).sum();
    let expected = rows.len() as f64 * f64::from(WORKING_DAYS_PER_MONTH);
    round_one_decimal(present as f64 / expected * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status: &str) -> Task {
        Task {
            id: status.into(),
            project_id: "p".into(),
            title: String::new(),
            status: Some(status.into()),
        }
    }

    fn present(days: u32) -> AttendanceSummaryRow {
        AttendanceSummaryRow {
            present_days: days,
            ..Default::default()
        }
    }

    #[test]
    fn completion_rate_of_nothing_is_zero() {
        assert_eq!(task_completion_rate(&[]), 0.0);
    }

    #[test]
    fn completion_rate_half() {
        assert_eq!(task_completion_rate(&[task("COMPLETED"), task("PENDING")]), 50.0);
    }

    #[test]
    fn completion_rate_rounds_to_one_decimal() {
        let tasks = vec![task("COMPLETED"), task("PENDING"), task("OVERDUE")];
        assert_eq!(task_completion_rate(&tasks), 33.3);
        let tasks = vec![task("CLOSE"), task("COMPLETED"), task("PENDING")];
        assert_eq!(task_completion_rate(&tasks), 66.7);
    }

    #[test]
    fn unknown_statuses_still_dilute_the_rate() {
        assert_eq!(task_completion_rate(&[task("COMPLETED"), task("DONE")]), 50.0);
    }

    #[test]
    fn attendance_rate_of_nothing_is_zero() {
        assert_eq!(attendance_rate(&[]), 0.0);
    }

    #[test]
    fn full_month_is_one_hundred() {
        assert_eq!(attendance_rate(&[present(22)]), 100.0);
        assert_eq!(attendance_rate(&[present(22), present(11)]), 75.0);
    }

    #[test]
    fn attendance_rate_is_not_clamped() {
        assert_eq!(attendance_rate(&[present(23)]), 104.5);
    }
}
