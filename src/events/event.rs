//! # Gate events emitted by admission, reconciliation and event sources.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Admission events**: outcome of `admit_and_create` calls
//! - **Reconciliation events**: in-flight set changes driven by lifecycle notifications
//! - **Infrastructure events**: event source and subscriber health
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use jobgate::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::JobCompleted)
//!     .with_job("0190-abcd")
//!     .with_in_flight(3);
//!
//! assert_eq!(ev.kind, EventKind::JobCompleted);
//! assert_eq!(ev.job.as_deref(), Some("0190-abcd"));
//! assert_eq!(ev.in_flight, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of gate events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Admission ===
    /// Scheduler accepted the job and it is now in-flight.
    ///
    /// Sets: `job`, `in_flight`
    JobLaunched,

    /// Admission skipped: the job is already in-flight.
    ///
    /// Sets: `job`
    JobDuplicate,

    /// Scheduler returned an error; the job stays untracked.
    ///
    /// Sets: `job`, `reason`
    LaunchFailed,

    /// In-flight count reached the limit; the caller waits for a completion.
    ///
    /// Sets: `job`, `in_flight`
    CapacityReached,

    /// Caller's token was cancelled before admission; nothing happened.
    ///
    /// Sets: `job`
    AdmissionCancelled,

    // === Reconciliation ===
    /// A job discovered through lifecycle events was marked in-flight.
    ///
    /// Sets: `job`, `in_flight`
    JobTracked,

    /// A tracked job reached a terminal state (or was deleted); one permit released.
    ///
    /// Sets: `job`, `in_flight`
    JobCompleted,

    /// A completion was observed while all permits were already idle; the release was dropped.
    ///
    /// Sets: `job`
    PermitCoalesced,

    // === Infrastructure ===
    /// Event source finished replaying existing objects.
    ///
    /// Sets: `in_flight`, `reason` (selector)
    SourceSynced,

    /// Event source stream ended.
    SourceClosed,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `reason` (`subscriber=... reason=...`)
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `reason` (panic message)
    SubscriberPanicked,
}

/// Gate event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Job identifier, if applicable.
    pub job: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// In-flight count observed when the event was produced.
    pub in_flight: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            job: None,
            reason: None,
            in_flight: None,
        }
    }

    #[inline]
    pub fn with_job(mut self, job: impl AsRef<str>) -> Self {
        self.job = Some(Arc::from(job.as_ref()));
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_in_flight(mut self, n: usize) -> Self {
        self.in_flight = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }
}
