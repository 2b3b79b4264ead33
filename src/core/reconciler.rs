//! # Reconciler: lifecycle notifications → in-flight set + completion permits.
//!
//! ```text
//! on_add(obj)          non-terminal ─► track(id)
//!                      terminal     ─► ignored (not counted, no release)
//! on_update(old, new)  new terminal ─► complete(id)
//!                      otherwise    ─► track(id) if absent
//! on_delete(obj)       always       ─► complete(id)
//!
//! track(id):    write lock ─► insert if absent
//! complete(id): write lock ─► remove if present ─► release one permit
//! ```
//!
//! Every transition is presence-checked, so a repeated delete, an update after a
//! delete, or an update for an object that was never tracked releases nothing.
//! Objects without an identifier are skipped.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::inflight::InFlight;
use crate::events::{Bus, Event, EventKind};
use crate::jobs::{JobId, TrackedObject};
use crate::source::LifecycleHandler;

/// Lifecycle handler that keeps a gate's in-flight set in step with the backend.
///
/// Obtained from [`Gate::reconciler`](crate::Gate::reconciler).
pub struct Reconciler {
    state: Arc<InFlight>,
    bus: Bus,
}

impl Reconciler {
    pub(crate) fn new(state: Arc<InFlight>, bus: Bus) -> Self {
        Self { state, bus }
    }

    /// Starts tracking `id` if absent. Never touches permits.
    async fn track(&self, id: &str) {
        let mut set = self.state.write().await;
        if set.contains(id) {
            return;
        }
        set.insert(JobId::from(id));
        let in_flight = set.len();
        drop(set);

        debug!(job_id = id, in_flight, "adding in-flight job");
        self.bus.publish(
            Event::new(EventKind::JobTracked)
                .with_job(id)
                .with_in_flight(in_flight),
        );
    }

    /// Stops tracking `id` and releases one permit, if it was tracked.
    async fn complete(&self, id: &str) {
        let mut set = self.state.write().await;
        if !set.remove(id) {
            return;
        }
        let in_flight = set.len();
        let coalesced = match self.state.permits() {
            Some(permits) => !permits.release(),
            None => false,
        };
        drop(set);

        if coalesced {
            debug!(job_id = id, "completion permit pool full, release coalesced");
            self.bus
                .publish(Event::new(EventKind::PermitCoalesced).with_job(id));
        }
        debug!(job_id = id, in_flight, "job finished");
        self.bus.publish(
            Event::new(EventKind::JobCompleted)
                .with_job(id)
                .with_in_flight(in_flight),
        );
    }
}

fn job_id<'a, O: TrackedObject>(obj: &'a O, op: &'static str) -> Option<&'a str> {
    let id = obj.job_id();
    if id.is_none() {
        warn!(op, "object has no job identifier, ignoring");
    }
    id
}

#[async_trait]
impl<O: TrackedObject> LifecycleHandler<O> for Reconciler {
    async fn on_add(&self, obj: &O) {
        let Some(id) = job_id(obj, "add") else {
            return;
        };
        if obj.is_terminal() {
            debug!(job_id = id, "ignoring finished job");
            return;
        }
        self.track(id).await;
    }

    async fn on_update(&self, _old: &O, new: &O) {
        let Some(id) = job_id(new, "update") else {
            return;
        };
        if new.is_terminal() {
            self.complete(id).await;
        } else {
            self.track(id).await;
        }
    }

    async fn on_delete(&self, obj: &O) {
        let Some(id) = job_id(obj, "delete") else {
            return;
        };
        self.complete(id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobObject;

    fn reconciler(limit: Option<usize>) -> (Reconciler, Arc<InFlight>) {
        let state = Arc::new(InFlight::new(limit));
        (Reconciler::new(Arc::clone(&state), Bus::new(16)), state)
    }

    fn running(id: &str) -> JobObject {
        JobObject::new(id).with_job_id(id)
    }

    fn failed(id: &str) -> JobObject {
        running(id).with_condition("Failed")
    }

    fn available(state: &InFlight) -> usize {
        state.permits().map_or(0, |p| p.available())
    }

    #[tokio::test]
    async fn test_add_tracks_running_and_skips_terminal() {
        let (r, state) = reconciler(Some(2));

        r.on_add(&running("a")).await;
        r.on_add(&failed("b")).await;

        assert!(state.read().await.contains("a"));
        assert!(!state.read().await.contains("b"));
        assert_eq!(available(&state), 0);
    }

    #[tokio::test]
    async fn test_double_delete_releases_once() {
        let (r, state) = reconciler(Some(2));
        r.on_add(&running("a")).await;

        r.on_delete(&running("a")).await;
        r.on_delete(&running("a")).await;

        assert_eq!(state.read().await.len(), 0);
        assert_eq!(available(&state), 1);
    }

    #[tokio::test]
    async fn test_terminal_update_then_delete_releases_once() {
        let (r, state) = reconciler(Some(2));
        r.on_add(&running("a")).await;

        r.on_update(&running("a"), &failed("a")).await;
        r.on_delete(&failed("a")).await;

        assert_eq!(available(&state), 1);
    }

    #[tokio::test]
    async fn test_untracked_completion_is_noop() {
        let (r, state) = reconciler(Some(2));

        r.on_delete(&running("ghost")).await;
        r.on_update(&running("ghost2"), &failed("ghost2")).await;

        assert_eq!(state.read().await.len(), 0);
        assert_eq!(available(&state), 0);
    }

    #[tokio::test]
    async fn test_non_terminal_update_tracks_missing_job() {
        let (r, state) = reconciler(None);

        r.on_update(&running("a"), &running("a")).await;
        r.on_update(&running("a"), &running("a")).await;

        assert_eq!(state.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_object_without_id_is_ignored() {
        let (r, state) = reconciler(Some(1));
        let anonymous = JobObject::new("no-label");

        r.on_add(&anonymous).await;
        r.on_delete(&anonymous).await;

        assert_eq!(state.read().await.len(), 0);
        assert_eq!(available(&state), 0);
    }

    #[tokio::test]
    async fn test_releases_coalesce_at_capacity() {
        let (r, state) = reconciler(Some(1));
        let mut rx = r.bus.subscribe();
        for id in ["a", "b"] {
            r.on_add(&running(id)).await;
        }

        r.on_delete(&running("a")).await;
        r.on_delete(&running("b")).await;
        assert_eq!(available(&state), 1);

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        assert!(kinds.contains(&EventKind::PermitCoalesced));
        assert_eq!(
            kinds.iter().filter(|k| **k == EventKind::JobCompleted).count(),
            2
        );
    }
}
