//! # Lifecycle event sources.
//!
//! - [`LifecycleSource`], [`LifecycleHandler`], [`LifecycleEvent`] - the watch contract
//! - [`LabelSelector`], [`Requirement`] - filter for relevant backend objects
//! - [`register`], [`Subscription`] - replay + readiness + live delivery driver
//! - [`ChannelSource`], [`ChannelSourceHandle`] - in-memory source

mod channel;
mod contract;
mod selector;
mod sync;

pub use channel::{ChannelSource, ChannelSourceHandle};
pub use contract::{LifecycleEvent, LifecycleHandler, LifecycleSource};
pub use selector::{LabelSelector, Requirement, tag_to_label};
pub use sync::{Subscription, register};
