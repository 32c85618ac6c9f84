//! Last-write-wins holder for the displayed dashboard.
//!
//! Each refresh (manual reload or month/year change) takes a ticket
//! before it starts fetching.  When it finishes it offers its result
//! with that ticket; the result is kept only if no newer refresh has
//! started since.  Stale results are dropped whole, never merged.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, info};

/// Identifies one refresh cycle.  Higher is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// The currently displayed view for one dashboard.
pub struct DashboardSession<V> {
    issued: AtomicU64,
    current: RwLock<Option<(RefreshTicket, V)>>,
}

impl<V: Clone> DashboardSession<V> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    /// Starts a refresh cycle.
    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is still the most recently issued one.
    pub fn is_latest(&self, ticket: RefreshTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Offers a finished view.  Returns `true` if it became the displayed
    /// view, `false` if a newer refresh superseded it.
    pub async fn commit(&self, ticket: RefreshTicket, view: V) -> bool {
        if !self.is_latest(ticket) {
            debug!(ticket = ticket.0, "discarding stale refresh result");
            return false;
        }
        let mut current = self.current.write().await;
        if matches!(&*current, Some((held, _)) if *held > ticket) {
            debug!(ticket = ticket.0, "discarding stale refresh result");
            return false;
        }
        *current = Some((ticket, view));
        info!(ticket = ticket.0, "dashboard refreshed");
        true
    }

    /// The displayed view, if any refresh has completed.
    pub async fn current(&self) -> Option<V> {
        self.current.read().await.as_ref().map(|(_, v)| v.clone())
    }
}

impl<V: Clone> Default for DashboardSession<V> {
    fn default() -> Self {
        Self::new()
    }
}
