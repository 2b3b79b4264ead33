//! # Completion permits: a bounded counting semaphore fed by job completions.
//!
//! Each observed terminal transition of a tracked job releases one permit; a
//! caller blocked on a full gate consumes one permit to proceed.
//!
//! ```text
//! Reconciler ── release() ──► [ idle permits ≤ capacity ] ──► acquire(token) ── Gate
//!                   │                                              │
//!                   └─ at capacity: coalesced (dropped)            └─ token cancelled: no permit taken
//! ```
//!
//! ## Rules
//! - The pool starts **empty**: permits only come from completions.
//! - `release()` never blocks. Once `capacity` permits are idle, further releases
//!   are coalesced and reported as `false`.
//! - `release()` must be serialized by the caller (the reconciler calls it under the
//!   in-flight write lock), so the idle count can never exceed `capacity`.
//! - `acquire()` consumes the permit (`forget`), it is not returned on drop.

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Outcome of a cancellable [`CompletionPermits::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// One permit was consumed.
    Acquired,
    /// The token was cancelled first; no permit was consumed.
    Cancelled,
}

/// Bounded pool of completion permits.
#[derive(Debug)]
pub struct CompletionPermits {
    sem: Semaphore,
    capacity: usize,
}

impl CompletionPermits {
    /// Creates an empty pool holding at most `capacity` idle permits.
    pub fn new(capacity: usize) -> Self {
        Self {
            sem: Semaphore::new(0),
            capacity,
        }
    }

    /// Maximum number of idle permits.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of idle permits right now.
    #[inline]
    pub fn available(&self) -> usize {
        self.sem.available_permits()
    }

    /// Waits for one permit, racing against `token`.
    ///
    /// Cancellation wins ties, so an already-cancelled token never consumes a permit.
    pub async fn acquire(&self, token: &CancellationToken) -> Acquire {
        tokio::select! {
            biased;
            _ = token.cancelled() => Acquire::Cancelled,
            res = self.sem.acquire() => match res {
                Ok(permit) => {
                    permit.forget();
                    Acquire::Acquired
                }
                Err(_closed) => Acquire::Cancelled,
            },
        }
    }

    /// Takes one permit if one is idle.
    pub fn try_acquire(&self) -> bool {
        match self.sem.try_acquire() {
            Ok(permit) => {
                permit.forget();
                true
            }
            Err(_) => false,
        }
    }

    /// Returns one permit to the pool.
    ///
    /// Returns `false` (and drops the release) when `capacity` permits are already idle.
    pub fn release(&self) -> bool {
        if self.sem.available_permits() >= self.capacity {
            return false;
        }
        self.sem.add_permits(1);
        true
    }
}
