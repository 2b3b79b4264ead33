//! # Source registration: replay, readiness, then live delivery.
//!
//! ```text
//! register(source, selector, handler)
//!   ├─► source.list(selector)          (bounded by sync_timeout, cancellable)
//!   ├─► handler.on_add(obj) for each   (replay; runs to completion once listed)
//!   ├─► publish SourceSynced           (readiness: register() returns here)
//!   └─► spawn delivery loop:
//!         loop {
//!           select! {
//!             token.cancelled()  → exit
//!             source.next()      → on_add / on_update / on_delete
//!                                  None → publish SourceClosed, exit
//!           }
//!         }
//! ```
//!
//! Replay completes before `register` returns, so the in-flight set reflects the
//! backend before the caller starts admitting jobs. A failed registration never
//! delivers part of the replay: the timeout and cancellation only cover listing.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{GateError, SourceError};
use crate::events::{Bus, Event, EventKind};
use crate::source::{LabelSelector, LifecycleEvent, LifecycleHandler, LifecycleSource};

/// A synced source whose delivery loop is running.
#[derive(Debug)]
pub struct Subscription {
    /// Number of pre-existing objects delivered through `on_add`.
    pub replayed: usize,
    /// Delivery loop; finishes on cancellation or when the source ends.
    pub handle: JoinHandle<()>,
}

/// Replays `source` into `handler`, then spawns the live delivery loop.
///
/// ### Errors
/// [`GateError::SyncFailed`] if listing fails, `sync_timeout` elapses (when set),
/// or `token` is cancelled before listing finished. Neither the handler nor the
/// bus has seen anything in that case, and nothing is spawned.
pub async fn register<O, S>(
    mut source: S,
    selector: &LabelSelector,
    handler: Arc<dyn LifecycleHandler<O>>,
    bus: Bus,
    token: CancellationToken,
    sync_timeout: Option<Duration>,
) -> Result<Subscription, GateError>
where
    O: Send + Sync + 'static,
    S: LifecycleSource<O>,
{
    let existing = tokio::select! {
        res = with_timeout(sync_timeout, source.list(selector)) => res?,
        _ = token.cancelled() => {
            return Err(GateError::SyncFailed { reason: "cancelled before sync completed".into() });
        }
    };

    for obj in &existing {
        handler.on_add(obj).await;
    }
    let replayed = existing.len();

    info!(replayed, selector = %selector, "event source synced");
    bus.publish(
        Event::new(EventKind::SourceSynced)
            .with_in_flight(replayed)
            .with_reason(selector.to_string()),
    );

    let handle = tokio::spawn(deliver(source, handler, bus, token));
    Ok(Subscription { replayed, handle })
}

async fn with_timeout<T, F>(limit: Option<Duration>, fut: F) -> Result<T, GateError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    let res = match limit {
        Some(dur) => time::timeout(dur, fut)
            .await
            .map_err(|_elapsed| GateError::SyncFailed {
                reason: format!("listing did not finish within {dur:?}"),
            })?,
        None => fut.await,
    };
    res.map_err(|e| GateError::SyncFailed {
        reason: e.to_string(),
    })
}

async fn deliver<O, S>(
    mut source: S,
    handler: Arc<dyn LifecycleHandler<O>>,
    bus: Bus,
    token: CancellationToken,
) where
    O: Send + Sync + 'static,
    S: LifecycleSource<O>,
{
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("event delivery cancelled");
                break;
            }
            ev = source.next() => match ev {
                Some(LifecycleEvent::Added(obj)) => handler.on_add(&obj).await,
                Some(LifecycleEvent::Updated { old, new }) => handler.on_update(&old, &new).await,
                Some(LifecycleEvent::Deleted(obj)) => handler.on_delete(&obj).await,
                None => {
                    info!("event source closed");
                    bus.publish(Event::new(EventKind::SourceClosed));
                    break;
                }
            }
        }
    }
}
