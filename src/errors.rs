//! Error types for the dashboard engine.
//!
//! Only the layers that talk to the outside world (the backend client,
//! snapshot loading, configuration and the Kanban sync) return these
//! errors.  The aggregation core never fails on malformed domain data;
//! it degrades to empty or zero values instead.

use thiserror::Error;

/// Errors surfaced by the fetch collaborator and its callers.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The backend could not be reached (connect, timeout, I/O).
    #[error("transport failure calling {url}: {message}")]
    Transport { url: String, message: String },

    /// A configuration value could not be used.
    #[error("configuration error: {0}")]
    Config(String),

    /// Month outside 1..=12 or a nonsensical year.
    #[error("invalid report period {month}/{year}")]
    InvalidPeriod { month: u32, year: i32 },

    /// A Kanban move referenced a task not on the board.
    #[error("task {0} is not on the board")]
    UnknownTask(String),

    /// A Kanban move targeted a column that does not exist.
    #[error("unknown task status {0:?}")]
    UnknownStatus(String),
}

impl DashboardError {
    pub fn transport(url: impl Into<String>, message: impl ToString) -> Self {
        DashboardError::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Whether the failure came from the network rather than from input.
    pub fn is_transport(&self) -> bool {
        matches!(self, DashboardError::Transport { .. })
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
