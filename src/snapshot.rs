//! Loading a complete, consistent set of collections.
//!
//! A [`Snapshot`] is everything one dashboard render needs.  It is built
//! in one go by [`load_snapshot`] and treated as immutable afterwards;
//! a refresh replaces it wholesale.  Per-department project fetches and
//! per-project task fetches are fanned out with [`rayon`], but the
//! function only returns once every request has finished, so aggregation
//! never sees a half-loaded snapshot.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::client::BackendClient;
use crate::errors::Result;
use crate::models::{
    AttendanceSummaryRow, Department, Employee, Meeting, Project, ReportPeriod, SalaryStatistics, Task,
};

/// Every collection fetched for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub period: ReportPeriod,
    pub employees: Vec<Employee>,
    pub departments: Vec<Department>,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub meetings: Vec<Meeting>,
    pub attendance: Vec<AttendanceSummaryRow>,
    pub salary: Option<SalaryStatistics>,
}

impl Snapshot {
    /// A snapshot with no data, for a backend that had nothing to say.
    pub fn empty(period: ReportPeriod) -> Self {
        Self {
            period,
            employees: Vec::new(),
            departments: Vec::new(),
            projects: Vec::new(),
            tasks: Vec::new(),
            meetings: Vec::new(),
            attendance: Vec::new(),
            salary: None,
        }
    }
}

/// Fetches every collection for `period`.
///
/// Any transport failure aborts the whole load; there is no partial
/// result.  Projects and tasks come back in department/project order
/// regardless of which request finished first.
pub fn load_snapshot(client: &dyn BackendClient, period: ReportPeriod) -> Result<Snapshot> {
    let started = Instant::now();
    let employees = client.employees()?;
    let departments = client.departments()?;

    let projects: Vec<Project> = departments
        .par_iter()
        .map(|dept| client.projects_for(&dept.id))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    let tasks: Vec<Task> = projects
        .par_iter()
        .map(|project| client.tasks_for(&project.id))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    let meetings = client.meetings()?;
    let attendance = client.attendance_summary(period)?;
    let salary = client.salary_statistics(period)?;

    info!(
        month = period.month,
        year = period.year,
        employees = employees.len(),
        departments = departments.len(),
        projects = projects.len(),
        tasks = tasks.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "snapshot loaded"
    );

    Ok(Snapshot {
        period,
        employees,
        departments,
        projects,
        tasks,
        meetings,
        attendance,
        salary,
    })
}
