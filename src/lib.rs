//! Dashboard Engine library crate.
//!
//! This crate derives the statistics behind the Admin, Manager and
//! Employee dashboards of an employee management system: status counts,
//! per-department breakdowns, attendance and completion rates, the
//! attendance leaderboard and today's meetings.  The aggregation modules
//! are pure functions over an immutable [`snapshot::Snapshot`]; fetching
//! and serving live in `client`, `snapshot` and `api`.

pub mod errors;
pub mod models;
pub mod datetime;
pub mod status;
pub mod grouping;
pub mod ranking;
pub mod window;
pub mod rates;
pub mod snapshot;
pub mod engine;
pub mod client;
pub mod session;
pub mod kanban;
pub mod config;
pub mod api;
