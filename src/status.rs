//! Status bucket counting.
//!
//! Projects and tasks carry a free-form `status` string.  The counters
//! here bucket a collection by exact, case-sensitive match against a
//! fixed, ordered category list.  Values outside the list (or missing
//! entirely) fall into no bucket but are still part of `total`.

use serde::Serialize;

use crate::models::{Project, Task};

/// The five project lifecycle states, in display order.
pub const PROJECT_CATEGORIES: [&str; 5] = ["PLANNED", "IN_PROGRESS", "DEVELOPED", "CLOSED", "ON_HOLD"];

/// The six task states, in display order.
pub const TASK_CATEGORIES: [&str; 6] = ["PENDING", "IN_PROGRESS", "COMPLETED", "CLOSE", "OVERDUE", "CANCELED"];

/// Anything that exposes a status discriminant.
pub trait HasStatus {
    fn status(&self) -> Option<&str>;
}

impl HasStatus for Project {
    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

impl HasStatus for Task {
    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

/// Per-category counts in category order, plus the collection size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub counts: Vec<(String, usize)>,
    pub total: usize,
}

impl StatusBreakdown {
    /// Count for `category`, or 0 if it is not one of the tracked buckets.
    pub fn get(&self, category: &str) -> usize {
        self.counts
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Items that matched some bucket.  Never exceeds `total`.
    pub fn categorised(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Counts `items` by the value `status_of` returns for each.
pub fn count_by<T, F>(items: &[T], status_of: F, categories: &[&str]) -> StatusBreakdown
where
    F: Fn(&T) -> Option<&str>,
{
    let mut counts: Vec<(String, usize)> = categories.iter().map(|c| (c.to_string(), 0)).collect();
    for item in items {
        let Some(status) = status_of(item) else {
            continue;
        };
        if let Some(slot) = counts.iter_mut().find(|(name, _)| name == status) {
            slot.1 += 1;
        }
    }
    StatusBreakdown {
        counts,
        total: items.len(),
    }
}

/// Counts any [`HasStatus`] collection against `categories`.
pub fn count_by_status<T: HasStatus>(items: &[T], categories: &[&str]) -> StatusBreakdown {
    count_by(items, |item| item.status(), categories)
}

/// Project counts as the dashboards display them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatusCounts {
    pub planned: usize,
    pub in_progress: usize,
    pub developed: usize,
    pub closed: usize,
    pub on_hold: usize,
    pub total: usize,
}

impl ProjectStatusCounts {
    pub fn from_projects<'a, I>(projects: I) -> Self
    where
        I: IntoIterator<Item = &'a Project>,
    {
        let subset: Vec<&Project> = projects.into_iter().collect();
        let b = count_by(&subset, |p| p.status.as_deref(), &PROJECT_CATEGORIES);
        Self {
            planned: b.get("PLANNED"),
            in_progress: b.get("IN_PROGRESS"),
            developed: b.get("DEVELOPED"),
            closed: b.get("CLOSED"),
            on_hold: b.get("ON_HOLD"),
            total: b.total,
        }
    }
}

/// Task counts as the dashboards display them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub close: usize,
    pub overdue: usize,
    pub canceled: usize,
    pub total: usize,
}

impl TaskStatusCounts {
    pub fn from_tasks<'a, I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let subset: Vec<&Task> = tasks.into_iter().collect();
        let b = count_by(&subset, |t| t.status.as_deref(), &TASK_CATEGORIES);
        Self {
            pending: b.get("PENDING"),
            in_progress: b.get("IN_PROGRESS"),
            completed: b.get("COMPLETED"),
            close: b.get("CLOSE"),
            overdue: b.get("OVERDUE"),
            canceled: b.get("CANCELED"),
            total: b.total,
        }
    }

    /// Tasks that count as done for the completion rate.
    pub fn finished(&self) -> usize {
        self.completed + self.close
    }
}
