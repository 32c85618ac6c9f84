//! Attendance leaderboard.

use crate::models::AttendanceSummaryRow;

/// Points per present day.
pub const PRESENT_WEIGHT: f64 = 10.0;
/// Points deducted per late day.
pub const LATE_PENALTY: f64 = 2.0;

/// `present*10 - late*2 + avgHours`.
pub fn performance_score(row: &AttendanceSummaryRow) -> f64 {
    f64::from(row.present_days) * PRESENT_WEIGHT - f64::from(row.late_days) * LATE_PENALTY + row.avg_hours
}

/// The `n` best rows by [`performance_score`], best first.
///
/// The input is left untouched; rows are cloned into the result.  Equal
/// scores keep their input order (the sort is stable), and a NaN
/// `avgHours` ranks below every real score.
pub fn top_performers(rows: &[AttendanceSummaryRow], n: usize) -> Vec<AttendanceSummaryRow> {
    let mut ranked: Vec<(f64, &AttendanceSummaryRow)> = rows
        .iter()
        .map(|row| {
            let score = performance_score(row);
            (if score.is_nan() { f64::NEG_INFINITY } else { score }, row)
        })
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.into_iter().take(n).map(|(_, row)| row.clone()).collect()
}
