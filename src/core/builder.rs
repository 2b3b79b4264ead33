use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::{
    config::Config,
    gate::{Gate, Listener},
    inflight::InFlight,
};
use crate::{
    events::Bus,
    jobs::SchedulerRef,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Gate`] with optional subscribers.
pub struct GateBuilder {
    cfg: Config,
    scheduler: SchedulerRef,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl GateBuilder {
    /// Creates a new builder with the given configuration and scheduler.
    pub fn new(cfg: Config, scheduler: SchedulerRef) -> Self {
        Self {
            cfg,
            scheduler,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive gate events (launches, completions, capacity waits)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the gate.
    ///
    /// With subscribers configured this must be called from within a tokio runtime:
    /// it spawns one worker per subscriber plus the bus listener.
    pub fn build(self) -> Gate {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let state = Arc::new(InFlight::new(self.cfg.capacity_limit()));

        let listener = if self.subscribers.is_empty() {
            None
        } else {
            let subs = SubscriberSet::new(self.subscribers, bus.clone());
            Some(subscriber_listener(&bus, subs))
        };

        Gate::new_internal(self.cfg, state, self.scheduler, bus, listener)
    }
}

/// Forwards bus events to the subscriber set (fire-and-forget).
///
/// The listener owns the set. Once stopped it forwards whatever is still buffered
/// on the bus, then shuts the set down.
fn subscriber_listener(bus: &Bus, set: SubscriberSet) -> Listener {
    let mut rx = bus.subscribe();
    let stop = CancellationToken::new();
    let token = stop.clone();

    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "subscriber listener lagged behind the event bus");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        loop {
            match rx.try_recv() {
                Ok(ev) => set.emit(&ev),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber listener lagged behind the event bus");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    });

    Listener { stop, handle }
}
