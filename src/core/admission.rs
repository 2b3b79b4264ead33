//! # Admission outcomes
//!
//! A successful [`Gate::admit_and_create`](crate::Gate::admit_and_create) call
//! performs either exactly one downstream launch or none at all. [`Admission`]
//! says which.
//!
//! ## Invariants
//! - `Launched` is the only outcome that called the scheduler.
//! - `Duplicate` and `Cancelled` leave the in-flight set and the permit pool
//!   exactly as they were.

/// Result of an admission request that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// The scheduler accepted the job; it is now tracked in-flight.
    Launched,

    /// The job was already in-flight; nothing was launched.
    ///
    /// Happens when a retry layer redelivers a request, or when lifecycle events
    /// reported the job before its admission call arrived.
    Duplicate,

    /// The caller's token was cancelled before capacity became available.
    ///
    /// The caller is expected to retry later or abandon the job.
    Cancelled,
}

impl Admission {
    /// True if this call launched the job.
    #[inline]
    pub fn is_launched(&self) -> bool {
        matches!(self, Admission::Launched)
    }
}
