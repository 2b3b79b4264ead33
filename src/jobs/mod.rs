//! # Job abstractions.
//!
//! - [`JobId`], [`JobDescription`] - producer-side identity and launch request
//! - [`TrackedObject`], [`Labeled`], [`JobObject`] - backend-side view used by reconciliation
//! - [`Scheduler`], [`SchedulerFn`], [`SchedulerRef`] - downstream launch capability

mod job;
mod object;
mod scheduler;

pub use job::{JobDescription, JobId};
pub use object::{
    ConditionKind, ID_LABEL, JobCondition, JobObject, Labeled, TAG_LABEL, TrackedObject,
};
pub use scheduler::{Scheduler, SchedulerFn, SchedulerRef};
