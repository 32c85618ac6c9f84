//! Per-group status breakdowns.
//!
//! Partitions projects by department (and tasks by project) and runs the
//! status counters over each partition.  Output follows the order of the
//! grouping collection, and every group appears even when nothing
//! belongs to it.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Department, Project, Task};
use crate::status::{ProjectStatusCounts, TaskStatusCounts};

/// Project status counts for one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentBreakdown {
    pub department_id: String,
    pub department_name: String,
    pub projects: ProjectStatusCounts,
}

/// Task status counts for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBreakdown {
    pub project_id: String,
    pub project_name: String,
    pub status: Option<String>,
    pub tasks: TaskStatusCounts,
}

/// Indexes `items` by `key`, keeping each bucket in input order.
fn index_by<'a, T, F>(items: &'a [T], key: F) -> HashMap<&'a str, Vec<&'a T>>
where
    F: Fn(&'a T) -> &'a str,
{
    let mut index: HashMap<&str, Vec<&T>> = HashMap::new();
    for item in items {
        index.entry(key(item)).or_default().push(item);
    }
    index
}

/// One [`DepartmentBreakdown`] per department, in department order.
pub fn group_projects_by_department(departments: &[Department], projects: &[Project]) -> Vec<DepartmentBreakdown> {
    let by_department = index_by(projects, |p| p.department_id.as_str());
    departments
        .iter()
        .map(|dept| {
            let subset = by_department.get(dept.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            DepartmentBreakdown {
                department_id: dept.id.clone(),
                department_name: dept.name.clone(),
                projects: ProjectStatusCounts::from_projects(subset.iter().copied()),
            }
        })
        .collect()
}

/// One [`ProjectBreakdown`] per project, in project order.
pub fn group_tasks_by_project(projects: &[Project], tasks: &[Task]) -> Vec<ProjectBreakdown> {
    let by_project = index_by(tasks, |t| t.project_id.as_str());
    projects
        .iter()
        .map(|project| {
            let subset = by_project.get(project.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            ProjectBreakdown {
                project_id: project.id.clone(),
                project_name: project.name.clone(),
                status: project.status.clone(),
                tasks: TaskStatusCounts::from_tasks(subset.iter().copied()),
            }
        })
        .collect()
}

/// Projects belonging to `department_id`, in input order.
pub fn projects_in_department<'a>(projects: &'a [Project], department_id: &str) -> Vec<&'a Project> {
    projects.iter().filter(|p| p.department_id == department_id).collect()
}

/// Tasks whose project is in `projects`, in input order.
pub fn tasks_for_projects<'a>(projects: &[&Project], tasks: &'a [Task]) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| projects.iter().any(|p| p.id == t.project_id))
        .collect()
}
