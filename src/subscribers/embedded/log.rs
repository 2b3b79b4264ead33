//! # LogWriter: renders gate events as `tracing` records
//!
//! Admission outcomes and reconciliation changes go to `debug`, failures and
//! subscriber trouble to `warn`, source lifecycle to `info`. Every record uses the
//! `jobgate::events` target; the gate's own `tracing` calls use the module targets,
//! so a filter can keep one stream or the other.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let job = e.job.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let seq = e.seq;

        match e.kind {
            EventKind::JobLaunched => {
                debug!(target: "jobgate::events", seq, job, in_flight = ?e.in_flight, "job launched")
            }
            EventKind::JobDuplicate => debug!(target: "jobgate::events", seq, job, "duplicate admission skipped"),
            EventKind::LaunchFailed => warn!(target: "jobgate::events", seq, job, reason, "job launch failed"),
            EventKind::CapacityReached => {
                debug!(target: "jobgate::events", seq, job, in_flight = ?e.in_flight, "max-in-flight reached")
            }
            EventKind::AdmissionCancelled => debug!(target: "jobgate::events", seq, job, "admission cancelled"),
            EventKind::JobTracked => {
                debug!(target: "jobgate::events", seq, job, in_flight = ?e.in_flight, "job tracked from lifecycle event")
            }
            EventKind::JobCompleted => {
                debug!(target: "jobgate::events", seq, job, in_flight = ?e.in_flight, "job complete")
            }
            EventKind::PermitCoalesced => debug!(target: "jobgate::events", seq, job, "completion permit coalesced"),
            EventKind::SourceSynced => {
                info!(target: "jobgate::events", seq, replayed = ?e.in_flight, selector = reason, "event source synced")
            }
            EventKind::SourceClosed => info!(target: "jobgate::events", seq, "event source closed"),
            EventKind::SubscriberOverflow => warn!(target: "jobgate::events", seq, reason, "subscriber dropped event"),
            EventKind::SubscriberPanicked => warn!(target: "jobgate::events", seq, reason, "subscriber panicked"),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    #[derive(Clone, Default)]
    struct Targets(Arc<Mutex<Vec<String>>>);

    impl<S: tracing::Subscriber> Layer<S> for Targets {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.0
                .lock()
                .unwrap()
                .push(event.metadata().target().to_owned());
        }
    }

    #[tokio::test]
    async fn test_records_use_events_target() {
        let targets = Targets::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(targets.clone()));

        let writer = LogWriter::new();
        writer
            .on_event(&Event::new(EventKind::JobLaunched).with_job("a"))
            .await;
        writer
            .on_event(&Event::subscriber_overflow("metrics", "full"))
            .await;

        assert_eq!(*targets.0.lock().unwrap(), vec!["jobgate::events"; 2]);
    }
}
