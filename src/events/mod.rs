//! Gate events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Gate::admit_and_create`, `Reconciler`, the source delivery loop,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the subscriber listener spawned by `GateBuilder::build`, which fans
//!   out to `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
