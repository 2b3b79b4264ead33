//! # jobgate
//!
//! **Jobgate** is an admission controller that sits between a job producer and a
//! downstream scheduler.
//!
//! It caps how many jobs are in-flight (launched and not yet terminal), makes
//! launches idempotent per job identifier, and learns about completions from a
//! stream of lifecycle notifications coming back from the scheduling backend.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        producer                                    scheduling backend
//!           │                                                 ▲   │
//!           │ admit_and_create(ctx, job)                      │   │ Added / Updated / Deleted
//!           ▼                                      create(job)│   ▼
//! ┌────────────────────────────────────────────┐      ┌───────┴──────────────────┐
//! │  Gate                                      │      │  LifecycleSource         │
//! │  - capacity wait (CompletionPermits)       │──────┤  list(selector) + next() │
//! │  - idempotent add + launch (write lock)    │      └──────────┬───────────────┘
//! └──────────────┬─────────────────────────────┘                 │ register()
//!                │  shared Arc<InFlight>                          ▼
//!                │                                  ┌──────────────────────────┐
//!                └─────────────────────────────────►│  Reconciler              │
//!                                                   │  track / complete + free │
//!                                                   └──────────────────────────┘
//!
//! Gate + Reconciler ── publish(Event) ──► Bus ──► listener ──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ### Lifecycle
//! ```text
//! Gate::builder(cfg, scheduler).with_subscribers(subs).build()
//!   └─► gate.register_source(source, token)
//!         ├─► list(selector)  ─► on_add(obj) for every existing object
//!         ├─► publish SourceSynced          (gate is now "ready")
//!         └─► spawn delivery loop: next() ─► on_add / on_update / on_delete
//!
//! producer ─► gate.admit_and_create(ctx, job) ─► Launched | Duplicate | Cancelled | Err(Launch)
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                          |
//! |-------------------|-------------------------------------------------------------|---------------------------------------------|
//! | **Admission**     | Capacity-bounded, idempotent launches.                      | [`Gate`], [`Admission`]                     |
//! | **Reconciliation**| Keep the in-flight set in step with the backend.            | [`Reconciler`], [`LifecycleHandler`]        |
//! | **Sources**       | Pluggable watch of backend job objects, label filtering.    | [`LifecycleSource`], [`LabelSelector`]      |
//! | **Scheduling**    | Downstream launch capability.                               | [`Scheduler`], [`SchedulerFn`]              |
//! | **Subscriber API**| Hook into gate events (logging, metrics, custom).           | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed errors for admission, launch, sources and config.     | [`GateError`], [`LaunchError`]              |
//! | **Configuration** | Ceiling, selector tags, timeouts; TOML + env loading.       | [`Config`], [`load_config`]                 |
//!
//! ## Optional features
//! - `logging`: exports the built-in `LogWriter` subscriber, which renders the
//!   event stream as `tracing` records under the `jobgate::events` target. The gate
//!   already logs its decisions directly; enable this when the event stream itself
//!   (subscriber overflow, sequence numbers) should show up in logs.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use jobgate::{Admission, ChannelSource, Config, Gate, JobDescription, JobObject, LaunchError, SchedulerFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.max_in_flight = 2;
//!     cfg.selector.tags = vec!["queue=default".into()];
//!
//!     let scheduler = SchedulerFn::arc("noop", |_ctx: CancellationToken, _job: JobDescription| async {
//!         Ok::<_, LaunchError>(())
//!     });
//!     let gate = Gate::builder(cfg, scheduler).build();
//!
//!     let (source, _feed) = ChannelSource::<JobObject>::new(Vec::new(), 64);
//!     let token = CancellationToken::new();
//!     gate.register_source(source, token.clone()).await?;
//!
//!     let outcome = gate.admit_and_create(&token, &JobDescription::new("job-1")).await?;
//!     assert_eq!(outcome, Admission::Launched);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod jobs;
mod source;
mod subscribers;

#[cfg(test)]
mod test_support;

// ---- Public re-exports ----

pub use crate::core::{
    Acquire, Admission, CompletionPermits, Config, Gate, GateBuilder, Reconciler, SelectorConfig,
    load_config, load_config_from_str,
};
pub use error::{ConfigError, GateError, LaunchError, SourceError};
pub use events::{Bus, Event, EventKind};
pub use jobs::{
    ConditionKind, ID_LABEL, JobCondition, JobDescription, JobId, JobObject, Labeled,
    SchedulerFn, SchedulerRef, Scheduler, TAG_LABEL, TrackedObject,
};
pub use source::{
    ChannelSource, ChannelSourceHandle, LabelSelector, LifecycleEvent, LifecycleHandler,
    LifecycleSource, Requirement, Subscription, register, tag_to_label,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose the built-in tracing subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
