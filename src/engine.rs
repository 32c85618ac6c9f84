//! Dashboard view-model construction.
//!
//! The `engine` module turns a complete [`Snapshot`] into the view-model
//! each role sees.  Every builder is a pure function of the snapshot and
//! the day considered "today"; callers compute that date once per pass
//! so a render straddling midnight does not mix two days.

use chrono::NaiveDate;
use serde::Serialize;

use crate::grouping::{
    group_projects_by_department, group_tasks_by_project, projects_in_department, tasks_for_projects,
    DepartmentBreakdown, ProjectBreakdown,
};
use crate::models::{AttendanceSummaryRow, Meeting, ReportPeriod, SalaryStatistics};
use crate::rates::{attendance_rate, completion_rate};
use crate::ranking::top_performers;
use crate::snapshot::Snapshot;
use crate::status::{ProjectStatusCounts, TaskStatusCounts};
use crate::window::meetings_on;

/// Leaderboard length used when the caller has no preference.
pub const DEFAULT_TOP_PERFORMERS: usize = 5;

/// Organisation-wide view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub period: ReportPeriod,
    pub total_employees: usize,
    pub total_departments: usize,
    pub projects: ProjectStatusCounts,
    pub tasks: TaskStatusCounts,
    pub departments: Vec<DepartmentBreakdown>,
    pub task_completion_rate: f64,
    pub attendance_rate: f64,
    pub top_performers: Vec<AttendanceSummaryRow>,
    pub meetings_today: Vec<Meeting>,
    pub salary: Option<SalaryStatistics>,
}

/// One department as its manager sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDashboard {
    pub period: ReportPeriod,
    pub department: Option<DepartmentBreakdown>,
    pub project_breakdowns: Vec<ProjectBreakdown>,
    pub tasks: TaskStatusCounts,
    pub task_completion_rate: f64,
    pub meetings_today: Vec<Meeting>,
}

/// A single employee's view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDashboard {
    pub period: ReportPeriod,
    pub code: String,
    pub attendance: Option<AttendanceSummaryRow>,
    pub attendance_rate: f64,
    pub meetings_today: Vec<Meeting>,
}

/// Builds the organisation-wide view, keeping `top_n` performers.
pub fn build_admin_dashboard(snapshot: &Snapshot, today: NaiveDate, top_n: usize) -> AdminDashboard {
    let tasks = TaskStatusCounts::from_tasks(&snapshot.tasks);
    AdminDashboard {
        period: snapshot.period,
        total_employees: snapshot.employees.len(),
        total_departments: snapshot.departments.len(),
        projects: ProjectStatusCounts::from_projects(&snapshot.projects),
        tasks,
        departments: group_projects_by_department(&snapshot.departments, &snapshot.projects),
        task_completion_rate: completion_rate(&tasks),
        attendance_rate: attendance_rate(&snapshot.attendance),
        top_performers: top_performers(&snapshot.attendance, top_n),
        meetings_today: meetings_on(&snapshot.meetings, today),
        salary: snapshot.salary.clone(),
    }
}

/// Builds the manager view for `department_id`.  An unknown department
/// yields an empty view rather than an error.
pub fn build_manager_dashboard(snapshot: &Snapshot, department_id: &str, today: NaiveDate) -> ManagerDashboard {
    let department = group_projects_by_department(&snapshot.departments, &snapshot.projects)
        .into_iter()
        .find(|b| b.department_id == department_id);
    let projects = projects_in_department(&snapshot.projects, department_id);
    let owned: Vec<_> = projects.iter().map(|p| (*p).clone()).collect();
    let tasks = TaskStatusCounts::from_tasks(tasks_for_projects(&projects, &snapshot.tasks));
    ManagerDashboard {
        period: snapshot.period,
        department,
        project_breakdowns: group_tasks_by_project(&owned, &snapshot.tasks),
        tasks,
        task_completion_rate: completion_rate(&tasks),
        meetings_today: meetings_on(&snapshot.meetings, today),
    }
}

/// Builds the view for employee `code`; an unknown code has no attendance.
pub fn build_employee_dashboard(snapshot: &Snapshot, code: &str, today: NaiveDate) -> EmployeeDashboard {
    let attendance = snapshot.attendance.iter().find(|row| row.code == code).cloned();
    let rate = attendance
        .as_ref()
        .map(|row| attendance_rate(std::slice::from_ref(row)))
        .unwrap_or(0.0);
    EmployeeDashboard {
        period: snapshot.period,
        code: code.to_string(),
        attendance,
        attendance_rate: rate,
        meetings_today: meetings_on(&snapshot.meetings, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Department, Employee, Project, Task};
    use chrono::Local;
    use pretty_assertions::assert_eq;

    fn snapshot(today: NaiveDate) -> Snapshot {
        let stamp = today.format("%d/%m/%Y").to_string();
        Snapshot {
            period: ReportPeriod::new(3, 2024).unwrap(),
            employees: vec![
                Employee {
                    code: "E1".into(),
                    name: "Ann".into(),
                    present_days: None,
                    late_days: None,
                    absent_days: None,
                    avg_hours: None,
                },
                Employee {
                    code: "E2".into(),
                    name: "Bob".into(),
                    present_days: None,
                    late_days: None,
                    absent_days: None,
                    avg_hours: None,
                },
            ],
            departments: vec![
                Department {
                    id: "A".into(),
                    name: "Alpha".into(),
                },
                Department {
                    id: "B".into(),
                    name: "Beta".into(),
                },
            ],
            projects: vec![
                Project {
                    id: "P1".into(),
                    department_id: "A".into(),
                    name: "One".into(),
                    status: Some("PLANNED".into()),
                },
                Project {
                    id: "P2".into(),
                    department_id: "A".into(),
                    name: "Two".into(),
                    status: Some("IN_PROGRESS".into()),
                },
                Project {
                    id: "P3".into(),
                    department_id: "B".into(),
                    name: "Three".into(),
                    status: Some("CLOSED".into()),
                },
            ],
            tasks: vec![
                Task {
                    id: "T1".into(),
                    project_id: "P1".into(),
                    title: String::new(),
                    status: Some("COMPLETED".into()),
                },
                Task {
                    id: "T2".into(),
                    project_id: "P2".into(),
                    title: String::new(),
                    status: Some("PENDING".into()),
                },
                Task {
                    id: "T3".into(),
                    project_id: "P3".into(),
                    title: String::new(),
                    status: Some("CLOSE".into()),
                },
            ],
            meetings: vec![
                Meeting {
                    id: "M2".into(),
                    title: "Review".into(),
                    start_time: format!("15:00:00 {stamp}"),
                    room_name: "R2".into(),
                    organizer_name: "Ann".into(),
                },
                Meeting {
                    id: "M1".into(),
                    title: "Standup".into(),
                    start_time: format!("09:00:00 {stamp}"),
                    room_name: "R1".into(),
                    organizer_name: "Bob".into(),
                },
                Meeting {
                    id: "M0".into(),
                    title: "Old".into(),
                    start_time: "09:00:00 01/01/2001".into(),
                    room_name: "R1".into(),
                    organizer_name: "Bob".into(),
                },
            ],
            attendance: vec![
                AttendanceSummaryRow {
                    code: "E1".into(),
                    name: "Ann".into(),
                    present_days: 22,
                    late_days: 0,
                    absent_days: 0,
                    avg_hours: 8.0,
                },
                AttendanceSummaryRow {
                    code: "E2".into(),
                    name: "Bob".into(),
                    present_days: 11,
                    late_days: 2,
                    absent_days: 11,
                    avg_hours: 7.0,
                },
            ],
            salary: Some(SalaryStatistics {
                total_net_salary: 9000.0,
                average_net_salary: 4500.0,
                total_employees: 2,
            }),
        }
    }

    #[test]
    fn admin_dashboard_aggregates_everything() {
        let today = Local::now().date_naive();
        let snap = snapshot(today);
        let view = build_admin_dashboard(&snap, today, DEFAULT_TOP_PERFORMERS);
        assert_eq!(view.total_employees, 2);
        assert_eq!(view.total_departments, 2);
        assert_eq!(view.projects.total, 3);
        assert_eq!(view.departments[0].projects.total, 2);
        assert_eq!(view.departments[1].projects.closed, 1);
        assert_eq!(view.task_completion_rate, 66.7);
        assert_eq!(view.attendance_rate, 75.0);
        assert_eq!(view.top_performers[0].code, "E1");
        let ids: Vec<&str> = view.meetings_today.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["M1", "M2"]);
        assert_eq!(view.salary.unwrap().total_employees, 2);
    }

    #[test]
    fn manager_dashboard_is_scoped_to_department() {
        let today = Local::now().date_naive();
        let snap = snapshot(today);
        let view = build_manager_dashboard(&snap, "A", today);
        assert_eq!(view.department.as_ref().unwrap().department_name, "Alpha");
        assert_eq!(view.project_breakdowns.len(), 2);
        assert_eq!(view.tasks.total, 2);
        assert_eq!(view.task_completion_rate, 50.0);

        let unknown = build_manager_dashboard(&snap, "Z", today);
        assert!(unknown.department.is_none());
        assert_eq!(unknown.task_completion_rate, 0.0);
    }

    #[test]
    fn employee_dashboard_uses_own_row() {
        let today = Local::now().date_naive();
        let snap = snapshot(today);
        let view = build_employee_dashboard(&snap, "E2", today);
        assert_eq!(view.attendance_rate, 50.0);
        assert_eq!(view.attendance.unwrap().late_days, 2);

        let missing = build_employee_dashboard(&snap, "E9", today);
        assert!(missing.attendance.is_none());
        assert_eq!(missing.attendance_rate, 0.0);
    }

    #[test]
    fn meetings_for_another_day_are_excluded() {
        let snap = snapshot(Local::now().date_naive());
        let view = build_admin_dashboard(&snap, NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(), 1);
        assert_eq!(view.meetings_today.len(), 1);
        assert_eq!(view.top_performers.len(), 1);
    }
}
