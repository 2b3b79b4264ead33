//! # Lifecycle event source contract.
//!
//! A [`LifecycleSource`] watches the backend and delivers notifications about job
//! objects matching a [`LabelSelector`]:
//!
//! ```text
//! list(selector) ──► [existing objects]        replay, before readiness
//! next()         ──► Added | Updated | Deleted  after readiness, until None
//! ```
//!
//! ## Delivery guarantees expected from a source
//! - per-object causal order (Add before Update before Delete);
//! - **no** cross-object order, **no** exactly-once delivery.
//!
//! A [`LifecycleHandler`] receives the notifications. Handlers must be idempotent
//! and presence-checked so redelivery and cross-object reordering are harmless.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::source::LabelSelector;

/// One lifecycle notification.
#[derive(Clone, Debug, PartialEq)]
pub enum LifecycleEvent<O> {
    /// A new matching object appeared.
    Added(O),
    /// An existing object changed.
    Updated { old: O, new: O },
    /// An object was removed from the backend.
    Deleted(O),
}

/// Receiver of lifecycle notifications.
#[async_trait]
pub trait LifecycleHandler<O>: Send + Sync + 'static
where
    O: Send + Sync + 'static,
{
    /// Object seen for the first time (replay at startup or genuinely new).
    async fn on_add(&self, obj: &O);

    /// Object changed; `new` is authoritative.
    async fn on_update(&self, old: &O, new: &O);

    /// Object removed; deletion is terminal regardless of reported status.
    async fn on_delete(&self, obj: &O);
}

/// Backend watch feeding a [`LifecycleHandler`].
#[async_trait]
pub trait LifecycleSource<O>: Send + 'static
where
    O: Send + Sync + 'static,
{
    /// Lists every pre-existing object matching `selector`.
    ///
    /// Called exactly once, before any [`next`](LifecycleSource::next). The selector
    /// also applies to every later event.
    async fn list(&mut self, selector: &LabelSelector) -> Result<Vec<O>, SourceError>;

    /// Waits for the next change; `None` ends the stream.
    ///
    /// Must be cancel-safe: the delivery loop races it against shutdown.
    async fn next(&mut self) -> Option<LifecycleEvent<O>>;
}
