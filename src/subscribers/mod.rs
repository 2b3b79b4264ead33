//! # Event subscribers.
//!
//! ```text
//! Gate / Reconciler ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                                │
//!                                                   ┌────────────┼────────────┐
//!                                                   ▼            ▼            ▼
//!                                               LogWriter     Metrics      Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use jobgate::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct LaunchCounter;
//!
//! #[async_trait]
//! impl Subscribe for LaunchCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::JobLaunched {
//!             // increment counter
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "launch-counter" }
//! }
//! ```

#[cfg(feature = "logging")]
mod embedded;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
