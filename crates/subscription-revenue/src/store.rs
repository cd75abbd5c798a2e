//! Owner of the current snapshot
//!
//! Refreshes take a ticket before fetching and hand it back on commit. Only
//! the most recently issued ticket may install its snapshot, so a slow fetch
//! that finishes after a newer refresh started is dropped instead of
//! overwriting fresher data. Readers hold an `Arc` and never see a partially
//! replaced snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::records::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Committed { generation: u64, records: usize },
    /// A newer refresh was started; this snapshot was discarded
    Superseded { generation: u64, latest: u64 },
}

#[derive(Debug)]
struct Current {
    snapshot: Arc<Snapshot>,
    generation: u64,
}

#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Current>,
    issued: AtomicU64,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Store holding the empty initial snapshot (generation 0)
    pub fn new() -> Self {
        Self::with_snapshot(Snapshot::default())
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Current {
                snapshot: Arc::new(snapshot),
                generation: 0,
            }),
            issued: AtomicU64::new(0),
        }
    }

    pub fn current(&self) -> Arc<Snapshot> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current.snapshot)
    }

    /// Generation of the installed snapshot (0 until the first commit)
    pub fn generation(&self) -> u64 {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Start a refresh; supersedes any refresh still in flight.
    /// The latest ticket wins even if its load fails: an older refresh that
    /// succeeds afterwards is still discarded and the current snapshot stays.
    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket {
            generation: self.issued.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    /// Install `snapshot` if `ticket` is still the latest refresh
    pub fn commit(&self, ticket: RefreshTicket, snapshot: Snapshot) -> RefreshOutcome {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

        let latest = self.issued.load(Ordering::SeqCst);
        if ticket.generation != latest || ticket.generation <= current.generation {
            tracing::debug!(
                ticket = ticket.generation,
                latest,
                "discarding superseded snapshot"
            );
            return RefreshOutcome::Superseded {
                generation: ticket.generation,
                latest,
            };
        }

        let records = snapshot.len();
        current.snapshot = Arc::new(snapshot);
        current.generation = ticket.generation;
        tracing::debug!(generation = ticket.generation, records, "snapshot committed");

        RefreshOutcome::Committed {
            generation: ticket.generation,
            records,
        }
    }
}
