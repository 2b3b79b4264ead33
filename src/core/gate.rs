//! # Gate: capacity-bounded, idempotent job admission.
//!
//! The [`Gate`] owns the in-flight set, the completion permit pool and the
//! downstream [`Scheduler`](crate::Scheduler). Producers call
//! [`Gate::admit_and_create`]; the [`Reconciler`] returned by [`Gate::reconciler`]
//! mutates the same state from lifecycle events.
//!
//! ## Admission flow
//! ```text
//! admit_and_create(ctx, job)
//!   ├─► ctx cancelled?                         → Ok(Cancelled)
//!   ├─► read lock: n = in_flight.len()
//!   ├─► limit > 0 && n >= limit:
//!   │     publish CapacityReached
//!   │     select! { permit ─► continue | ctx cancelled ─► Ok(Cancelled) }
//!   └─► write lock:
//!         ├─ id present            → Ok(Duplicate)
//!         ├─ scheduler.create(job) → Err  → Err(Launch), id NOT recorded
//!         └─                         Ok   → insert id, Ok(Launched)
//! ```
//!
//! ## Capacity is approximate
//! A permit is a **liveness** signal, not a reservation: receiving one lets exactly
//! one waiter proceed without re-checking the set size. Callers racing past the
//! read-locked size check, or a permit left idle by a completion nobody was waiting
//! for, can push the in-flight count transiently above the limit. What the gate
//! guarantees is that, once at the limit, admissions proceed no faster than
//! completions are observed.
//!
//! ## Locking
//! The scheduler call runs inside the write-locked region, so a slow `create`
//! delays every other admission and every lifecycle event.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::admission::Admission;
use super::builder::GateBuilder;
use super::config::Config;
use super::inflight::InFlight;
use super::permits::Acquire;
use super::reconciler::Reconciler;
use crate::error::GateError;
use crate::events::{Bus, Event, EventKind};
use crate::jobs::{JobDescription, JobId, SchedulerRef, TrackedObject};
use crate::source::{self, LabelSelector, LifecycleSource, Subscription};

/// Admission gate for one deployment.
pub struct Gate {
    cfg: Config,
    state: Arc<InFlight>,
    scheduler: SchedulerRef,
    reconciler: Arc<Reconciler>,
    bus: Bus,
    listener: Option<Listener>,
}

/// Bus-to-subscribers forwarding task, present only when subscribers were configured.
pub(crate) struct Listener {
    pub(crate) stop: CancellationToken,
    pub(crate) handle: JoinHandle<()>,
}

impl Gate {
    /// Starts building a gate around `scheduler`.
    pub fn builder(cfg: Config, scheduler: SchedulerRef) -> GateBuilder {
        GateBuilder::new(cfg, scheduler)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        state: Arc<InFlight>,
        scheduler: SchedulerRef,
        bus: Bus,
        listener: Option<Listener>,
    ) -> Self {
        let reconciler = Arc::new(Reconciler::new(Arc::clone(&state), bus.clone()));
        Self {
            cfg,
            state,
            scheduler,
            reconciler,
            bus,
            listener,
        }
    }

    /// Admits `job` if there is capacity (waiting for a completion otherwise) and
    /// launches it unless it is already in-flight.
    ///
    /// ### Returns
    /// - `Ok(Launched)`: exactly one scheduler call succeeded, the job is tracked.
    /// - `Ok(Duplicate)`: the job was already tracked; no scheduler call.
    /// - `Ok(Cancelled)`: `ctx` was cancelled before capacity became available; no side effect.
    /// - `Err(GateError::Launch)`: the scheduler failed; the job stays untracked so a
    ///   retry is treated as a first attempt.
    ///
    /// ### Cancellation
    /// `ctx` is checked on entry and raced against the capacity wait. Once past the
    /// wait, the add/launch runs to completion. `ctx` is still passed to the scheduler.
    pub async fn admit_and_create(
        &self,
        ctx: &CancellationToken,
        job: &JobDescription,
    ) -> Result<Admission, GateError> {
        if ctx.is_cancelled() {
            return Ok(self.cancelled(job));
        }

        if let Some(permits) = self.state.permits() {
            let in_flight = self.state.read().await.len();
            if in_flight >= permits.capacity() {
                debug!(job_id = %job.id, in_flight, limit = permits.capacity(), "max-in-flight reached");
                self.bus.publish(
                    Event::new(EventKind::CapacityReached)
                        .with_job(&job.id)
                        .with_in_flight(in_flight),
                );
                if permits.acquire(ctx).await == Acquire::Cancelled {
                    return Ok(self.cancelled(job));
                }
            }
        }

        self.add(ctx, job).await
    }

    /// Idempotent add + launch under the exclusive lock.
    async fn add(
        &self,
        ctx: &CancellationToken,
        job: &JobDescription,
    ) -> Result<Admission, GateError> {
        let mut set = self.state.write().await;

        if set.contains(job.id.as_str()) {
            debug!(job_id = %job.id, "skipping already queued job");
            self.bus
                .publish(Event::new(EventKind::JobDuplicate).with_job(&job.id));
            return Ok(Admission::Duplicate);
        }

        if let Err(e) = self.scheduler.create(ctx, job).await {
            warn!(job_id = %job.id, scheduler = self.scheduler.name(), error = %e, "failed to launch job");
            self.bus.publish(
                Event::new(EventKind::LaunchFailed)
                    .with_job(&job.id)
                    .with_reason(e.to_string()),
            );
            return Err(GateError::Launch {
                job: job.id.clone(),
                source: e,
            });
        }

        set.insert(job.id.clone());
        let in_flight = set.len();
        drop(set);

        debug!(job_id = %job.id, in_flight, "job launched");
        self.bus.publish(
            Event::new(EventKind::JobLaunched)
                .with_job(&job.id)
                .with_in_flight(in_flight),
        );
        Ok(Admission::Launched)
    }

    fn cancelled(&self, job: &JobDescription) -> Admission {
        debug!(job_id = %job.id, "admission cancelled");
        self.bus
            .publish(Event::new(EventKind::AdmissionCancelled).with_job(&job.id));
        Admission::Cancelled
    }

    /// Lifecycle handler sharing this gate's state.
    pub fn reconciler(&self) -> Arc<Reconciler> {
        Arc::clone(&self.reconciler)
    }

    /// Builds the label selector from the configured tags.
    pub fn selector(&self) -> Result<LabelSelector, GateError> {
        LabelSelector::for_tags(&self.cfg.selector.tags)
    }

    /// Subscribes this gate's reconciler to `source`.
    ///
    /// Returns once every pre-existing object has been replayed, so admissions made
    /// afterwards see the backend's live jobs. Errors are fatal to startup.
    pub async fn register_source<O, S>(
        &self,
        source: S,
        token: CancellationToken,
    ) -> Result<Subscription, GateError>
    where
        O: TrackedObject,
        S: LifecycleSource<O>,
    {
        let selector = self.selector()?;
        source::register(
            source,
            &selector,
            self.reconciler(),
            self.bus.clone(),
            token,
            self.cfg.sync_timeout(),
        )
        .await
    }

    /// Event bus (subscribe for raw events).
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Configured ceiling (`None` = unlimited).
    pub fn limit(&self) -> Option<usize> {
        self.cfg.capacity_limit()
    }

    pub async fn in_flight_count(&self) -> usize {
        self.state.read().await.len()
    }

    /// Sorted snapshot of tracked job identifiers.
    pub async fn in_flight(&self) -> Vec<JobId> {
        self.state.read().await.snapshot()
    }

    pub async fn is_in_flight(&self, id: &str) -> bool {
        self.state.read().await.contains(id)
    }

    /// Idle completion permits (`0` when unlimited).
    pub fn available_permits(&self) -> usize {
        self.state.permits().map_or(0, |p| p.available())
    }

    /// Stops the subscriber listener.
    ///
    /// Events published before this call are still handed to every subscriber,
    /// and the call returns once their queues are drained.
    pub async fn shutdown(mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        listener.stop.cancel();
        if let Err(e) = listener.handle.await {
            warn!(error = %e, "subscriber listener did not finish cleanly");
        }
    }
}
