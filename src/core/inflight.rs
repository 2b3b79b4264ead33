//! # In-flight bookkeeping shared by the gate and the reconciler.
//!
//! ```text
//!            Gate (read: size check)      Gate (write: idempotent add + launch)
//!                     │                               │
//!                     ▼                               ▼
//!          ┌──────────────────────── RwLock ────────────────────────┐
//!          │  InFlightSet: HashSet<JobId>                           │
//!          └────────────────────────────────────────────────────────┘
//!                     ▲                               │
//!                     │                               ▼ release (under write lock)
//!     Reconciler (write: track / complete)    CompletionPermits
//! ```
//!
//! ## Rules
//! - A `JobId` is present iff the job is believed non-terminal.
//! - Every mutation happens under the write guard; size checks use the read guard.
//! - Permits are released only while the write guard is held.

use std::collections::HashSet;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::permits::CompletionPermits;
use crate::jobs::JobId;

/// Set of jobs believed to be requested-or-running and not yet terminal.
///
/// Only reachable through [`InFlight`]'s guards; callers outside the crate see
/// snapshots via [`Gate::in_flight`](crate::Gate::in_flight).
#[derive(Debug, Default)]
pub(crate) struct InFlightSet {
    jobs: HashSet<JobId>,
}

impl InFlightSet {
    pub fn contains(&self, id: &str) -> bool {
        self.jobs.contains(id)
    }

    /// Inserts `id`; returns `false` if it was already present.
    pub fn insert(&mut self, id: JobId) -> bool {
        self.jobs.insert(id)
    }

    /// Removes `id`; returns `false` if it was absent.
    pub fn remove(&mut self, id: &str) -> bool {
        self.jobs.remove(id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Sorted copy of the tracked identifiers.
    pub fn snapshot(&self) -> Vec<JobId> {
        let mut ids: Vec<JobId> = self.jobs.iter().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

/// Lock-protected in-flight set plus the optional permit pool.
#[derive(Debug)]
pub(crate) struct InFlight {
    set: RwLock<InFlightSet>,
    permits: Option<CompletionPermits>,
}

impl InFlight {
    /// `limit = None` disables the permit pool (unlimited admission).
    pub(crate) fn new(limit: Option<usize>) -> Self {
        Self {
            set: RwLock::new(InFlightSet::default()),
            permits: limit.map(CompletionPermits::new),
        }
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, InFlightSet> {
        self.set.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, InFlightSet> {
        self.set.write().await
    }

    pub(crate) fn permits(&self) -> Option<&CompletionPermits> {
        self.permits.as_ref()
    }
}
