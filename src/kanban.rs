//! Task board with local, unsynced moves.
//!
//! Dragging a card between columns changes only the board's local
//! overrides; the authoritative task list it was built from is left
//! alone and never feeds back into the dashboard statistics.  Overrides
//! stay visible as pending until [`KanbanBoard::sync`] has pushed them to
//! the backend.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::client::BackendClient;
use crate::errors::{DashboardError, Result};
use crate::models::Task;
use crate::status::TASK_CATEGORIES;

/// One column of the board.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanColumn {
    pub status: &'static str,
    pub cards: Vec<Task>,
}

/// A local status change waiting to be written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingMove {
    pub task_id: String,
    pub from: Option<String>,
    pub to: String,
}

/// Outcome of a [`KanbanBoard::sync`] call.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub synced: Vec<String>,
    pub failed: Vec<(String, DashboardError)>,
}

#[derive(Debug, Clone)]
pub struct KanbanBoard {
    tasks: Vec<Task>,
    overrides: HashMap<String, &'static str>,
}

impl KanbanBoard {
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            overrides: HashMap::new(),
        }
    }

    /// Status shown for `task`, with any local override applied.
    fn effective_status<'a>(&'a self, task: &'a Task) -> Option<&'a str> {
        self.overrides
            .get(&task.id)
            .copied()
            .or(task.status.as_deref())
    }

    /// Moves a card to the `to` column locally.  Moving a card back to
    /// its authoritative status clears the override.
    pub fn move_card(&mut self, task_id: &str, to: &str) -> Result<()> {
        let Some(column) = TASK_CATEGORIES.iter().copied().find(|c| *c == to) else {
            return Err(DashboardError::UnknownStatus(to.to_string()));
        };
        let Some(task) = self.tasks.iter().find(|t| t.id == task_id) else {
            return Err(DashboardError::UnknownTask(task_id.to_string()));
        };
        if task.status.as_deref() == Some(column) {
            self.overrides.remove(task_id);
        } else {
            self.overrides.insert(task_id.to_string(), column);
        }
        Ok(())
    }

    /// The six task columns in display order.  Cards whose status is not
    /// a known column are left off the board.
    pub fn columns(&self) -> Vec<KanbanColumn> {
        TASK_CATEGORIES
            .iter()
            .map(|&status| KanbanColumn {
                status,
                cards: self
                    .tasks
                    .iter()
                    .filter(|t| self.effective_status(t) == Some(status))
                    .map(|t| {
                        let mut card = t.clone();
                        card.status = Some(status.to_string());
                        card
                    })
                    .collect(),
            })
            .collect()
    }

    /// Local moves not yet written back, in board order.
    pub fn pending(&self) -> Vec<PendingMove> {
        self.tasks
            .iter()
            .filter_map(|t| {
                self.overrides.get(&t.id).map(|to| PendingMove {
                    task_id: t.id.clone(),
                    from: t.status.clone(),
                    to: to.to_string(),
                })
            })
            .collect()
    }

    pub fn has_unsynced_changes(&self) -> bool {
        !self.overrides.is_empty()
    }

    /// The authoritative tasks, untouched by local moves.
    pub fn authoritative(&self) -> &[Task] {
        &self.tasks
    }

    /// Writes every pending move through `client`.  Successful moves are
    /// folded into the board's task list; failed ones stay pending.
    pub fn sync(&mut self, client: &dyn BackendClient) -> SyncReport {
        let mut report = SyncReport::default();
        for pending in self.pending() {
            match client.update_task_status(&pending.task_id, &pending.to) {
                Ok(()) => {
                    self.overrides.remove(&pending.task_id);
                    if let Some(task) = self.tasks.iter_mut().find(|t| t.id == pending.task_id) {
                        task.status = Some(pending.to.clone());
                    }
                    report.synced.push(pending.task_id);
                }
                Err(err) => {
                    warn!(task = %pending.task_id, error = %err, "task status write failed; keeping local move");
                    report.failed.push((pending.task_id, err));
                }
            }
        }
        info!(synced = report.synced.len(), failed = report.failed.len(), "kanban sync finished");
        report
    }
}
