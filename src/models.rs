//! Data models for the Dashboard Engine.
//!
//! The `models` module defines the canonical records every dashboard
//! statistic is computed from: employees, departments, projects, tasks,
//! meetings, monthly attendance rows and salary statistics.  They derive
//! `Serialize` and `Deserialize` so they can be decoded straight from the
//! backend and echoed back inside view-models.
//!
//! The backend is not consistent about field names (a department id may
//! arrive as `id`, `deptID` or `departmentId`), so departments, projects
//! and tasks pass through the `normalize_*` adapters below before they
//! reach the aggregation code.  Downstream modules only ever see one
//! shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{DashboardError, Result};

/// A member of staff as returned by the employee listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Employee code, unique within the organisation.
    pub code: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub present_days: Option<u32>,
    #[serde(default)]
    pub late_days: Option<u32>,
    #[serde(default)]
    pub absent_days: Option<u32>,
    /// Average hours worked per present day.
    #[serde(default)]
    pub avg_hours: Option<f64>,
}

/// A department after normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
}

/// A project after normalisation.  `status` is kept verbatim; values
/// outside the five project categories are simply not counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub department_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// A task after normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// A scheduled meeting.  `start_time` uses the backend's
/// `HH:mm:ss dd/MM/yyyy` local format and is parsed lazily by
/// [`crate::datetime::parse_local_date_time`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub room_name: String,
    #[serde(default)]
    pub organizer_name: String,
}

/// One employee's attendance totals for a month.  Missing counters
/// decode as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummaryRow {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub present_days: u32,
    #[serde(default)]
    pub late_days: u32,
    #[serde(default)]
    pub absent_days: u32,
    #[serde(default)]
    pub avg_hours: f64,
}

/// Organisation-wide salary figures for a month.  This is a single
/// aggregate, not a per-employee listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryStatistics {
    #[serde(default)]
    pub total_net_salary: f64,
    #[serde(default)]
    pub average_net_salary: f64,
    #[serde(default)]
    pub total_employees: u32,
}

/// The month/year filter every dashboard is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// Calendar month, 1-indexed.
    pub month: u32,
    pub year: i32,
}

impl ReportPeriod {
    /// Builds a period, rejecting months outside 1..=12 and years chrono
    /// cannot represent.
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) || chrono::NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(DashboardError::InvalidPeriod { month, year });
        }
        Ok(Self { month, year })
    }

    /// The period containing `date`.
    pub fn containing(date: chrono::NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            month: date.month(),
            year: date.year(),
        }
    }
}

/// Field names the backend uses for a department's id, in priority order.
pub const DEPARTMENT_ID_KEYS: &[&str] = &["id", "deptID", "departmentId"];
/// Field names the backend uses for a department's name.
pub const DEPARTMENT_NAME_KEYS: &[&str] = &["name", "departmentName"];
/// Field names a project uses to reference its department.
pub const PROJECT_DEPARTMENT_KEYS: &[&str] = &["departmentId", "deptID"];

/// Returns the first of `keys` present on `raw` as a non-empty string.
/// Numbers are stringified so `{"id": 7}` and `{"id": "7"}` agree.
fn first_string(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// The `status` field exactly as sent.  Unlike ids it is neither trimmed
/// nor stringified, so `" CLOSED"` or `3` stay outside every bucket.
fn raw_status(raw: &Value) -> Option<String> {
    raw.get("status").and_then(Value::as_str).map(str::to_string)
}

/// Maps a raw department object onto [`Department`].  Returns `None`
/// (and logs) when no id alias is present.
pub fn normalize_department(raw: &Value) -> Option<Department> {
    let Some(id) = first_string(raw, DEPARTMENT_ID_KEYS) else {
        warn!(department = %raw, "department has no id field; skipping");
        return None;
    };
    let name = first_string(raw, DEPARTMENT_NAME_KEYS).unwrap_or_default();
    Some(Department { id, name })
}

/// Maps a raw project object onto [`Project`].
///
/// When the project body omits its department key, `fallback_department`
/// (the department it was fetched under) is used instead.
pub fn normalize_project(raw: &Value, fallback_department: Option<&str>) -> Option<Project> {
    let Some(id) = first_string(raw, &["id", "projectId"]) else {
        warn!(project = %raw, "project has no id field; skipping");
        return None;
    };
    let department_id = first_string(raw, PROJECT_DEPARTMENT_KEYS)
        .or_else(|| fallback_department.map(str::to_string))
        .unwrap_or_default();
    Some(Project {
        id,
        department_id,
        name: first_string(raw, &["name", "projectName"]).unwrap_or_default(),
        status: raw_status(raw),
    })
}

/// Canonical spelling of the in-progress task status.
pub const TASK_IN_PROGRESS: &str = "IN_PROGRESS";

/// Rewrites legacy task status spellings to their canonical value.
///
/// Some backend rows carry `"IN PROGRESS"` (with a space) for the same
/// bucket as `"IN_PROGRESS"`.  The aggregators match exactly, so the
/// value is migrated here once instead of being special-cased in every
/// counter.
pub fn canonical_task_status(status: &str) -> &str {
    match status {
        "IN PROGRESS" => {
            debug!(status, "normalising legacy task status");
            TASK_IN_PROGRESS
        }
        other => other,
    }
}

/// Maps a raw task object onto [`Task`], normalising its status.
pub fn normalize_task(raw: &Value, fallback_project: Option<&str>) -> Option<Task> {
    let Some(id) = first_string(raw, &["id", "taskId"]) else {
        warn!(task = %raw, "task has no id field; skipping");
        return None;
    };
    let project_id = first_string(raw, &["projectId"])
        .or_else(|| fallback_project.map(str::to_string))
        .unwrap_or_default();
    let status = raw_status(raw).map(|s| canonical_task_status(&s).to_string());
    Some(Task {
        id,
        project_id,
        title: first_string(raw, &["title", "name"]).unwrap_or_default(),
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn department_aliases_are_accepted() {
        let a = normalize_department(&json!({"id": "D1", "name": "Sales"})).unwrap();
        let b = normalize_department(&json!({"deptID": "D1", "departmentName": "Sales"})).unwrap();
        let c = normalize_department(&json!({"departmentId": 1, "name": "Ops"})).unwrap();
        assert_eq!(a, b);
        assert_eq!(c.id, "1");
        assert_eq!(c.name, "Ops");
    }

    #[test]
    fn department_without_id_is_skipped() {
        assert!(normalize_department(&json!({"name": "Orphan"})).is_none());
        assert!(normalize_department(&json!({"id": "  ", "name": "Blank"})).is_none());
    }

    #[test]
    fn project_department_key_falls_back_to_fetch_context() {
        let p = normalize_project(&json!({"id": "P1", "deptID": "D2", "status": "PLANNED"}), Some("D9")).unwrap();
        assert_eq!(p.department_id, "D2");
        let q = normalize_project(&json!({"id": "P2"}), Some("D9")).unwrap();
        assert_eq!(q.department_id, "D9");
        assert_eq!(q.status, None);
    }

    #[test]
    fn legacy_in_progress_spelling_is_migrated() {
        let t = normalize_task(&json!({"id": 3, "projectId": "P1", "status": "IN PROGRESS"}), None).unwrap();
        assert_eq!(t.status.as_deref(), Some(TASK_IN_PROGRESS));
        let u = normalize_task(&json!({"id": 4, "status": "in progress"}), Some("P1")).unwrap();
        assert_eq!(u.status.as_deref(), Some("in progress"));
        assert_eq!(u.project_id, "P1");
    }

    #[test]
    fn status_is_kept_verbatim() {
        let p = normalize_project(&json!({"id": "P1", "status": " CLOSED "}), None).unwrap();
        assert_eq!(p.status.as_deref(), Some(" CLOSED "));
        let counts = crate::status::ProjectStatusCounts::from_projects([&p]);
        assert_eq!(counts.closed, 0);
        assert_eq!(counts.total, 1);

        let numeric = normalize_project(&json!({"id": "P2", "status": 3}), None).unwrap();
        assert_eq!(numeric.status, None);
        let t = normalize_task(&json!({"id": "T1", "projectId": "P1", "status": "IN PROGRESS "}), None).unwrap();
        assert_eq!(t.status.as_deref(), Some("IN PROGRESS "));
    }

    #[test]
    fn attendance_row_defaults_missing_counters() {
        let row: AttendanceSummaryRow = serde_json::from_value(json!({"code": "E1", "name": "Ann"})).unwrap();
        assert_eq!(row.present_days, 0);
        assert_eq!(row.avg_hours, 0.0);
    }

    #[test]
    fn report_period_validates_month() {
        assert!(ReportPeriod::new(0, 2024).is_err());
        assert!(ReportPeriod::new(13, 2024).is_err());
        assert_eq!(ReportPeriod::new(3, 2024).unwrap().month, 3);
    }
}
