//! Gate core: admission, reconciliation and shared in-flight state.
//!
//! Internal modules:
//! - [`gate`]: admission entry point (capacity wait + idempotent launch);
//! - [`reconciler`]: lifecycle handler keeping the in-flight set current;
//! - [`inflight`]: lock-protected in-flight set shared by both;
//! - [`permits`]: bounded completion permit pool;
//! - [`builder`]: wires bus, subscribers and state into a [`Gate`];
//! - [`config`]: configuration and loading.

mod admission;
mod builder;
mod config;
mod gate;
mod inflight;
mod permits;
mod reconciler;

pub use admission::Admission;
pub use builder::GateBuilder;
pub use config::{Config, SelectorConfig, load_config, load_config_from_str};
pub use gate::Gate;
pub use permits::{Acquire, CompletionPermits};
pub use reconciler::Reconciler;
